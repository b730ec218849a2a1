//! Notification Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Notification, NotificationRepository, NotificationType};
use crate::shared::error::{map_db_error, AppError};
use crate::shared::pagination::{Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    notification_type: String,
    data: serde_json::Value,
    viewed: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification, AppError> {
        let notification_type = self
            .notification_type
            .parse::<NotificationType>()
            .map_err(AppError::Internal)?;

        Ok(Notification {
            id: self.id,
            user_id: self.user_id,
            notification_type,
            data: self.data,
            viewed: self.viewed,
            created_at: self.created_at,
        })
    }
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, notification_type, data, viewed, created_at";

/// PostgreSQL notification repository implementation.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create_many(&self, notifications: &[Notification]) -> Result<Vec<Notification>, AppError> {
        if notifications.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = notifications.iter().map(|n| n.id).collect();
        let user_ids: Vec<i64> = notifications.iter().map(|n| n.user_id).collect();
        let types: Vec<String> = notifications
            .iter()
            .map(|n| n.notification_type.as_str().to_string())
            .collect();
        let data: Vec<serde_json::Value> = notifications.iter().map(|n| n.data.clone()).collect();
        let created: Vec<DateTime<Utc>> = notifications.iter().map(|n| n.created_at).collect();

        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            INSERT INTO notifications (id, user_id, notification_type, data, created_at)
            SELECT * FROM UNNEST($1::BIGINT[], $2::BIGINT[], $3::TEXT[], $4::JSONB[], $5::TIMESTAMPTZ[])
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(&ids)
        .bind(&user_ids)
        .bind(&types)
        .bind(&data)
        .bind(&created)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Notification already exists", "User not found"))?;

        rows.into_iter().map(|r| r.into_notification()).collect()
    }

    async fn find_for_user(&self, user_id: i64, pagination: Pagination) -> Result<Page<Notification>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|r| r.into_notification())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn count_unread(&self, user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT viewed",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn mark_viewed(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let updated = sqlx::query_scalar::<_, i64>(
            "UPDATE notifications SET viewed = TRUE WHERE user_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let removed = sqlx::query_scalar::<_, i64>(
            "DELETE FROM notifications WHERE user_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(removed)
    }

    async fn delete_older_than(&self, before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
