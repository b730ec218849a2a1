//! Ports to other modules and to image storage.
//!
//! Modules talk to each other over HTTP; services only see these traits.

use async_trait::async_trait;

use crate::domain::entities::NewNotification;
use crate::domain::value_objects::{GroupRole, ImageKind};
use crate::shared::error::AppError;

/// Access to the groups module.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupGateway: Send + Sync {
    /// Role of the token's user in the group, `None` when not a member.
    async fn user_role(&self, token: &str, group_id: i64) -> Result<Option<GroupRole>, AppError>;
}

/// Access to the notifications module.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify(&self, notifications: Vec<NewNotification>) -> Result<(), AppError>;
}

/// Storage of uploaded images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image and return its public path.
    async fn store(&self, kind: ImageKind, bytes: Vec<u8>) -> Result<String, AppError>;

    /// Delete a previously stored image by public path.
    async fn remove(&self, public_path: &str) -> Result<(), AppError>;
}

/// Deliver notifications without failing the caller.
pub async fn dispatch_notifications(gateway: &dyn NotificationGateway, notifications: Vec<NewNotification>) {
    if notifications.is_empty() {
        return;
    }
    let count = notifications.len();
    match gateway.notify(notifications).await {
        Ok(()) => tracing::debug!(count, "Notifications dispatched"),
        Err(e) => tracing::warn!(count, error = %e, "Failed to dispatch notifications"),
    }
}

/// Best-effort removal of an image that is no longer referenced.
pub async fn discard_image(store: &dyn ImageStore, public_path: Option<String>) {
    if let Some(path) = public_path {
        if let Err(e) = store.remove(&path).await {
            tracing::warn!(path = %path, error = %e, "Failed to remove image");
        }
    }
}

/// Membership check shared by every group-scoped module.
pub async fn require_member(gateway: &dyn GroupGateway, token: &str, group_id: i64) -> Result<GroupRole, AppError> {
    gateway
        .user_role(token, group_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Not a member of this group".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NotificationType;

    #[tokio::test]
    async fn test_dispatch_swallows_gateway_errors() {
        let mut gateway = MockNotificationGateway::new();
        gateway
            .expect_notify()
            .times(1)
            .returning(|_| Err(AppError::Upstream("down".into())));

        dispatch_notifications(
            &gateway,
            vec![NewNotification::new(1, NotificationType::GroupRemoved, serde_json::json!({}))],
        )
        .await;
    }

    #[tokio::test]
    async fn test_dispatch_skips_empty_batches() {
        let mut gateway = MockNotificationGateway::new();
        gateway.expect_notify().never();
        dispatch_notifications(&gateway, vec![]).await;
    }

    #[tokio::test]
    async fn test_require_member() {
        let mut gateway = MockGroupGateway::new();
        gateway
            .expect_user_role()
            .withf(|_, group_id| *group_id == 1)
            .returning(|_, _| Ok(Some(GroupRole::User)));
        gateway
            .expect_user_role()
            .withf(|_, group_id| *group_id == 2)
            .returning(|_, _| Ok(None));

        assert_eq!(require_member(&gateway, "token", 1).await.unwrap(), GroupRole::User);
        assert!(matches!(
            require_member(&gateway, "token", 2).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
