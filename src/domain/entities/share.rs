//! Public share of a list of orders.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};

/// Maps to the `share_list_orders` table:
/// - id: UUID PRIMARY KEY (the public token)
/// - list_orders_id: BIGINT NOT NULL REFERENCES list_orders(id) ON DELETE CASCADE
/// - group_id: BIGINT NOT NULL REFERENCES groups(id) ON DELETE CASCADE
/// - user_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq)]
pub struct ShareListOrders {
    pub id: Uuid,
    pub list_orders_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ShareListOrders {
    pub fn new(list_orders_id: i64, group_id: i64, user_id: i64, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            list_orders_id,
            group_id,
            user_id,
            expires_at: now + lifetime,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Repository trait for share data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareRepository: Send + Sync {
    async fn create(&self, share: &ShareListOrders) -> Result<ShareListOrders, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShareListOrders>, AppError>;

    /// The user's shares that have not expired, newest first.
    async fn find_for_user(&self, user_id: i64, pagination: Pagination) -> Result<Page<ShareListOrders>, AppError>;

    /// Delete the user's shares; returns the removed tokens.
    async fn delete(&self, user_id: i64, ids: &[Uuid]) -> Result<Vec<Uuid>, AppError>;

    async fn delete_expired(&self) -> Result<u64, AppError>;
}
