//! Product entity, shop prices and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Unit;
use crate::shared::error::AppError;
use crate::shared::pagination::{NameFilter, Page, Pagination};

/// A product a group buys.
///
/// Maps to the `products` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - group_id: BIGINT NOT NULL REFERENCES groups(id) ON DELETE CASCADE
/// - name: VARCHAR(50) NOT NULL, UNIQUE (group_id, name)
/// - description: VARCHAR(500) NULL
/// - image: TEXT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Price of a product in one shop (`product_shops` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductShop {
    pub product_id: i64,
    pub shop_id: i64,
    pub price: f64,
    pub unit: Unit,
}

/// Selection criteria for product listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub ids: Option<Vec<i64>>,
    /// Only products sold by this shop.
    pub shop_id: Option<i64>,
    pub filter: Option<NameFilter>,
}

/// Repository trait for Product data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product of a group.
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<Product>, AppError>;

    async fn find(
        &self,
        group_id: i64,
        query: ProductQuery,
        pagination: Pagination,
    ) -> Result<Page<Product>, AppError>;

    /// Create a product; the name must be unused in the group.
    async fn create(&self, product: &Product) -> Result<Product, AppError>;

    async fn update(&self, product: &Product) -> Result<Product, AppError>;

    /// Delete products of a group; returns the removed rows.
    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<Product>, AppError>;

    async fn set_image(&self, id: i64, image: Option<String>) -> Result<(), AppError>;

    /// Subset of `ids` that are products of the group.
    async fn existing_ids(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    /// Replace every shop price of a product in one transaction.
    async fn set_shop_prices(
        &self,
        product_id: i64,
        prices: &[ProductShop],
    ) -> Result<Vec<ProductShop>, AppError>;

    /// Shop prices of the given products.
    async fn find_shop_prices(&self, product_ids: &[i64]) -> Result<Vec<ProductShop>, AppError>;
}
