//! List of orders entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::order::Order;
use crate::shared::error::AppError;
use crate::shared::pagination::{NameFilter, Page, Pagination};

/// A shopping list: a named set of orders of one group.
///
/// Maps to the `list_orders` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - group_id: BIGINT NOT NULL REFERENCES groups(id) ON DELETE CASCADE
/// - user_id: BIGINT NULL REFERENCES users(id) ON DELETE SET NULL (creator)
/// - name: VARCHAR(50) NOT NULL, UNIQUE (group_id, name)
/// - description: VARCHAR(500) NULL
/// - date_to_buy: DATE NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOrders {
    pub id: i64,
    pub group_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub date_to_buy: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Price of a list, summed from the shop prices of its orders.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ListOrdersPrice {
    pub total: f64,
    pub bought: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOrdersQuery {
    pub ids: Option<Vec<i64>>,
    pub filter: Option<NameFilter>,
}

/// Repository trait for ListOrders data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListOrdersRepository: Send + Sync {
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<ListOrders>, AppError>;

    async fn find(
        &self,
        group_id: i64,
        query: ListOrdersQuery,
        pagination: Pagination,
    ) -> Result<Page<ListOrders>, AppError>;

    async fn create(&self, list: &ListOrders) -> Result<ListOrders, AppError>;

    async fn update(&self, list: &ListOrders) -> Result<ListOrders, AppError>;

    /// Delete lists of a group with their orders; returns the removed IDs.
    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    /// Insert a list together with its orders in one transaction.
    async fn create_with_orders(&self, list: &ListOrders, orders: &[Order]) -> Result<ListOrders, AppError>;

    /// Sum of `amount * price` over orders with a shop price.
    async fn price(&self, id: i64) -> Result<ListOrdersPrice, AppError>;
}
