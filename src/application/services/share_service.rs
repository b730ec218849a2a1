//! Share Service
//!
//! Public, expiring, read-only links to a list of orders.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use super::Actor;
use crate::config::ShareSettings;
use crate::domain::services::{dispatch_notifications, require_member, GroupGateway, NotificationGateway};
use crate::domain::{
    ListOrders, ListOrdersRepository, NewNotification, NotificationType, OrderDetail, OrderRepository,
    ShareListOrders, ShareRepository,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};

/// Share service trait
#[async_trait]
pub trait ShareService: Send + Sync {
    /// Create a public link to a list
    async fn create(&self, actor: &Actor, group_id: i64, list_orders_id: i64) -> Result<SharedLink, ShareError>;

    /// Resolve a public token; no authentication involved
    async fn get_shared(&self, token: Uuid) -> Result<SharedListOrders, ShareError>;

    async fn get_user_shares(&self, user_id: i64, pagination: Pagination) -> Result<Page<SharedLink>, ShareError>;

    async fn remove(&self, user_id: i64, ids: &[Uuid]) -> Result<Vec<Uuid>, ShareError>;

    /// Delete expired shares; returns how many were removed
    async fn remove_expired(&self) -> Result<u64, ShareError>;
}

/// A share with its public URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedLink {
    pub share: ShareListOrders,
    pub url: String,
}

/// What an anonymous visitor of a share sees.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedListOrders {
    pub list: ListOrders,
    pub orders: Vec<OrderDetail>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("Share not found or expired")]
    NotFound,

    #[error("List of orders not found")]
    ListNotFound,

    #[error(transparent)]
    Other(#[from] AppError),
}

impl From<ShareError> for AppError {
    fn from(e: ShareError) -> Self {
        match e {
            ShareError::NotFound | ShareError::ListNotFound => AppError::NotFound(e.to_string()),
            ShareError::Other(e) => e,
        }
    }
}

pub struct ShareServiceImpl<S, L, O>
where
    S: ShareRepository,
    L: ListOrdersRepository,
    O: OrderRepository,
{
    share_repo: Arc<S>,
    list_repo: Arc<L>,
    order_repo: Arc<O>,
    groups: Arc<dyn GroupGateway>,
    notifications: Arc<dyn NotificationGateway>,
    settings: ShareSettings,
}

impl<S, L, O> ShareServiceImpl<S, L, O>
where
    S: ShareRepository,
    L: ListOrdersRepository,
    O: OrderRepository,
{
    pub fn new(
        share_repo: Arc<S>,
        list_repo: Arc<L>,
        order_repo: Arc<O>,
        groups: Arc<dyn GroupGateway>,
        notifications: Arc<dyn NotificationGateway>,
        settings: ShareSettings,
    ) -> Self {
        Self {
            share_repo,
            list_repo,
            order_repo,
            groups,
            notifications,
            settings,
        }
    }

    fn link(&self, share: ShareListOrders) -> SharedLink {
        let url = format!("{}/{}", self.settings.public_url.trim_end_matches('/'), share.id);
        SharedLink { share, url }
    }
}

#[async_trait]
impl<S, L, O> ShareService for ShareServiceImpl<S, L, O>
where
    S: ShareRepository + 'static,
    L: ListOrdersRepository + 'static,
    O: OrderRepository + 'static,
{
    async fn create(&self, actor: &Actor, group_id: i64, list_orders_id: i64) -> Result<SharedLink, ShareError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        let list = self
            .list_repo
            .find_by_id(group_id, list_orders_id)
            .await?
            .ok_or(ShareError::ListNotFound)?;

        let share = ShareListOrders::new(
            list.id,
            group_id,
            actor.user_id,
            Duration::days(self.settings.expiration_days),
        );
        let link = self.link(self.share_repo.create(&share).await?);
        tracing::info!(list_orders_id, share_id = %link.share.id, "List of orders shared");

        dispatch_notifications(
            self.notifications.as_ref(),
            vec![NewNotification::new(
                actor.user_id,
                NotificationType::ShareListOrdersCreated,
                json!({
                    "list_orders_id": list.id.to_string(),
                    "list_orders_name": list.name,
                    "url": link.url,
                }),
            )],
        )
        .await;
        Ok(link)
    }

    async fn get_shared(&self, token: Uuid) -> Result<SharedListOrders, ShareError> {
        let share = self
            .share_repo
            .find_by_id(token)
            .await?
            .filter(|share| !share.is_expired())
            .ok_or(ShareError::NotFound)?;

        let list = self
            .list_repo
            .find_by_id(share.group_id, share.list_orders_id)
            .await?
            .ok_or(ShareError::NotFound)?;
        let orders = self.order_repo.find_details_by_list(list.id).await?;

        Ok(SharedListOrders {
            list,
            orders,
            expires_at: share.expires_at,
        })
    }

    async fn get_user_shares(&self, user_id: i64, pagination: Pagination) -> Result<Page<SharedLink>, ShareError> {
        let page = self.share_repo.find_for_user(user_id, pagination).await?;
        Ok(page.map(|share| self.link(share)))
    }

    async fn remove(&self, user_id: i64, ids: &[Uuid]) -> Result<Vec<Uuid>, ShareError> {
        Ok(self.share_repo.delete(user_id, ids).await?)
    }

    async fn remove_expired(&self) -> Result<u64, ShareError> {
        Ok(self.share_repo.delete_expired().await?)
    }
}
