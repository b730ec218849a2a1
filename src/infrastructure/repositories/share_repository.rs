//! Share Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{ShareListOrders, ShareRepository};
use crate::shared::error::{map_db_error, AppError};
use crate::shared::pagination::{Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct ShareRow {
    id: Uuid,
    list_orders_id: i64,
    group_id: i64,
    user_id: i64,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ShareRow {
    fn into_share(self) -> ShareListOrders {
        ShareListOrders {
            id: self.id,
            list_orders_id: self.list_orders_id,
            group_id: self.group_id,
            user_id: self.user_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

const SHARE_COLUMNS: &str = "id, list_orders_id, group_id, user_id, expires_at, created_at";

/// PostgreSQL share repository implementation.
#[derive(Clone)]
pub struct PgShareRepository {
    pool: PgPool,
}

impl PgShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    async fn create(&self, share: &ShareListOrders) -> Result<ShareListOrders, AppError> {
        let row = sqlx::query_as::<_, ShareRow>(&format!(
            r#"
            INSERT INTO share_list_orders ({cols})
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {cols}
            "#,
            cols = SHARE_COLUMNS
        ))
        .bind(share.id)
        .bind(share.list_orders_id)
        .bind(share.group_id)
        .bind(share.user_id)
        .bind(share.expires_at)
        .bind(share.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Share already exists", "List of orders not found"))?;

        Ok(row.into_share())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShareListOrders>, AppError> {
        let row = sqlx::query_as::<_, ShareRow>(&format!(
            "SELECT {} FROM share_list_orders WHERE id = $1",
            SHARE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_share()))
    }

    /// Only shares that have not expired yet.
    async fn find_for_user(&self, user_id: i64, pagination: Pagination) -> Result<Page<ShareListOrders>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM share_list_orders WHERE user_id = $1 AND expires_at > NOW()",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ShareRow>(&format!(
            r#"
            SELECT {}
            FROM share_list_orders
            WHERE user_id = $1 AND expires_at > NOW()
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            SHARE_COLUMNS
        ))
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(|r| r.into_share()).collect(), total))
    }

    async fn delete(&self, user_id: i64, ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let removed = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM share_list_orders WHERE user_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(removed)
    }

    async fn delete_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM share_list_orders WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
