//! Notification Service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::{NewNotification, Notification, NotificationRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Store notifications sent by other modules
    async fn create(&self, notifications: Vec<NewNotification>) -> Result<Vec<Notification>, AppError>;

    async fn get_user_notifications(&self, user_id: i64, pagination: Pagination) -> Result<Page<Notification>, AppError>;

    async fn get_unread_count(&self, user_id: i64) -> Result<i64, AppError>;

    async fn mark_viewed(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    async fn remove(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    /// Delete notifications older than `days`
    async fn remove_older_than(&self, days: i64) -> Result<u64, AppError>;
}

pub struct NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    notification_repo: Arc<N>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<N> NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    pub fn new(notification_repo: Arc<N>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            notification_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<N> NotificationService for NotificationServiceImpl<N>
where
    N: NotificationRepository + 'static,
{
    async fn create(&self, notifications: Vec<NewNotification>) -> Result<Vec<Notification>, AppError> {
        let now = Utc::now();
        let rows: Vec<Notification> = notifications
            .into_iter()
            .map(|n| Notification {
                id: self.id_generator.generate(),
                user_id: n.user_id,
                notification_type: n.notification_type,
                data: n.data,
                viewed: false,
                created_at: now,
            })
            .collect();

        self.notification_repo.create_many(&rows).await
    }

    async fn get_user_notifications(&self, user_id: i64, pagination: Pagination) -> Result<Page<Notification>, AppError> {
        self.notification_repo.find_for_user(user_id, pagination).await
    }

    async fn get_unread_count(&self, user_id: i64) -> Result<i64, AppError> {
        self.notification_repo.count_unread(user_id).await
    }

    async fn mark_viewed(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        self.notification_repo.mark_viewed(user_id, ids).await
    }

    async fn remove(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        self.notification_repo.delete(user_id, ids).await
    }

    async fn remove_older_than(&self, days: i64) -> Result<u64, AppError> {
        self.notification_repo
            .delete_older_than(Utc::now() - Duration::days(days))
            .await
    }
}
