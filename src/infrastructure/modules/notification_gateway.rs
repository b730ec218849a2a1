//! Notification delivery through the notifications module's internal endpoint.

use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Serialize;

use super::client::ModuleClient;
use crate::domain::services::NotificationGateway;
use crate::domain::NewNotification;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

pub const INTERNAL_NOTIFICATIONS_PATH: &str = "/api/v1/internal/notifications";

#[derive(Serialize)]
struct NotificationsBody<'a> {
    notifications: &'a [NewNotification],
}

pub struct HttpNotificationGateway {
    client: ModuleClient,
}

impl HttpNotificationGateway {
    pub fn new(client: ModuleClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationGateway for HttpNotificationGateway {
    async fn notify(&self, notifications: Vec<NewNotification>) -> Result<(), AppError> {
        let body = NotificationsBody {
            notifications: &notifications,
        };
        let result = self
            .client
            .post_json_internal::<_, IgnoredAny>(INTERNAL_NOTIFICATIONS_PATH, &body)
            .await;

        metrics::record_notifications_dispatched(notifications.len(), result.is_ok());
        result.map(|_| ()).map_err(AppError::from)
    }
}
