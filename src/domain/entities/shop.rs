//! Shop entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::{NameFilter, Page, Pagination};

/// A shop where a group buys products.
///
/// Maps to the `shops` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - group_id: BIGINT NOT NULL REFERENCES groups(id) ON DELETE CASCADE
/// - name: VARCHAR(50) NOT NULL, UNIQUE (group_id, name)
/// - address: VARCHAR(200) NULL
/// - description: VARCHAR(500) NULL
/// - image: TEXT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Selection criteria for shop listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopQuery {
    pub ids: Option<Vec<i64>>,
    /// Only shops selling this product.
    pub product_id: Option<i64>,
    pub filter: Option<NameFilter>,
}

/// Repository trait for Shop data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShopRepository: Send + Sync {
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<Shop>, AppError>;

    async fn find(&self, group_id: i64, query: ShopQuery, pagination: Pagination) -> Result<Page<Shop>, AppError>;

    async fn create(&self, shop: &Shop) -> Result<Shop, AppError>;

    async fn update(&self, shop: &Shop) -> Result<Shop, AppError>;

    /// Delete shops of a group; returns the removed rows.
    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<Shop>, AppError>;

    async fn set_image(&self, id: i64, image: Option<String>) -> Result<(), AppError>;

    /// Subset of `ids` that are shops of the group.
    async fn existing_ids(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;
}
