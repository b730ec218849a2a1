//! Order entity and repository trait.
//!
//! An order is one line of a list: a product, an optional shop, an amount.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Unit;
use crate::shared::error::AppError;
use crate::shared::pagination::{NameFilter, Page, Pagination};

pub const MAX_ORDER_AMOUNT: f64 = 1_000_000.0;

/// Maps to the `orders` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - group_id: BIGINT NOT NULL REFERENCES groups(id) ON DELETE CASCADE
/// - list_orders_id: BIGINT NOT NULL REFERENCES list_orders(id) ON DELETE CASCADE
/// - user_id: BIGINT NULL REFERENCES users(id) ON DELETE SET NULL
/// - product_id: BIGINT NOT NULL REFERENCES products(id) ON DELETE CASCADE
/// - shop_id: BIGINT NULL REFERENCES shops(id) ON DELETE SET NULL
/// - description: VARCHAR(500) NULL
/// - amount: DOUBLE PRECISION NOT NULL CHECK (amount > 0)
/// - unit: VARCHAR(10) NOT NULL
/// - bought: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub group_id: i64,
    pub list_orders_id: i64,
    pub user_id: Option<i64>,
    pub product_id: i64,
    pub shop_id: Option<i64>,
    pub description: Option<String>,
    pub amount: f64,
    pub unit: Unit,
    pub bought: bool,
    pub created_at: DateTime<Utc>,
}

/// Order joined with the names of its product and shop.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    pub product_name: String,
    pub shop_name: Option<String>,
}

/// Which name a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderFilterSection {
    #[default]
    Product,
    Shop,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub ids: Option<Vec<i64>>,
    pub list_orders_id: Option<i64>,
    pub filter: Option<NameFilter>,
    pub filter_section: OrderFilterSection,
}

/// Repository trait for Order data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<Order>, AppError>;

    async fn find(
        &self,
        group_id: i64,
        query: OrderQuery,
        pagination: Pagination,
    ) -> Result<Page<OrderDetail>, AppError>;

    /// Every order of a list.
    async fn find_by_list(&self, list_orders_id: i64) -> Result<Vec<Order>, AppError>;

    /// Every order of a list with product and shop names.
    async fn find_details_by_list(&self, list_orders_id: i64) -> Result<Vec<OrderDetail>, AppError>;

    /// Insert orders in one transaction.
    async fn create_many(&self, orders: &[Order]) -> Result<Vec<Order>, AppError>;

    async fn update(&self, order: &Order) -> Result<Order, AppError>;

    /// Delete orders of a group; returns the removed IDs.
    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    async fn set_bought(&self, group_id: i64, id: i64, bought: bool) -> Result<Option<Order>, AppError>;
}
