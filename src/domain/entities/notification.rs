//! Notification entity and repository trait.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    UserRegistered,
    UserPasswordChanged,
    GroupUserAdded,
    GroupUserRemoved,
    GroupUserSetAsAdmin,
    GroupRemoved,
    ShareListOrdersCreated,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::UserRegistered,
        NotificationType::UserPasswordChanged,
        NotificationType::GroupUserAdded,
        NotificationType::GroupUserRemoved,
        NotificationType::GroupUserSetAsAdmin,
        NotificationType::GroupRemoved,
        NotificationType::ShareListOrdersCreated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::UserPasswordChanged => "user_password_changed",
            Self::GroupUserAdded => "group_user_added",
            Self::GroupUserRemoved => "group_user_removed",
            Self::GroupUserSetAsAdmin => "group_user_set_as_admin",
            Self::GroupRemoved => "group_removed",
            Self::ShareListOrdersCreated => "share_list_orders_created",
        }
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown notification type '{}'", s))
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps to the `notifications` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - user_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - notification_type: VARCHAR(40) NOT NULL
/// - data: JSONB NOT NULL DEFAULT '{}'
/// - viewed: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub data: serde_json::Value,
    pub viewed: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification to be dispatched to the notifications module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    #[serde(with = "crate::shared::snowflake::serde_id")]
    pub user_id: i64,
    pub notification_type: NotificationType,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl NewNotification {
    pub fn new(user_id: i64, notification_type: NotificationType, data: serde_json::Value) -> Self {
        Self {
            user_id,
            notification_type,
            data,
        }
    }
}

/// Repository trait for Notification data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_many(&self, notifications: &[Notification]) -> Result<Vec<Notification>, AppError>;

    /// Newest first.
    async fn find_for_user(&self, user_id: i64, pagination: Pagination) -> Result<Page<Notification>, AppError>;

    async fn count_unread(&self, user_id: i64) -> Result<i64, AppError>;

    /// Mark the user's notifications as viewed; returns the affected IDs.
    async fn mark_viewed(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    /// Delete the user's notifications; returns the removed IDs.
    async fn delete(&self, user_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    async fn delete_older_than(&self, before: DateTime<Utc>) -> Result<u64, AppError>;
}
