//! User Service
//!
//! Handles profile management of the authenticated user.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::auth_service::{hash_password, verify_password};
use crate::domain::services::{dispatch_notifications, discard_image, ImageStore, NotificationGateway};
use crate::domain::{
    GroupRepository, ImageKind, NewNotification, NotificationType, SessionRepository, User, UserRepository,
};
use crate::shared::error::AppError;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get the caller's own profile
    async fn get_me(&self, user_id: i64) -> Result<User, UserError>;

    /// Public profiles of the given users
    async fn get_users(&self, ids: &[i64]) -> Result<Vec<User>, UserError>;

    async fn modify_me(&self, user_id: i64, name: &str) -> Result<User, UserError>;

    /// Change password and sign out every session
    async fn change_password(&self, user_id: i64, old_password: &str, new_password: &str) -> Result<(), UserError>;

    async fn set_image(&self, user_id: i64, image: Vec<u8>) -> Result<User, UserError>;

    async fn remove_image(&self, user_id: i64) -> Result<User, UserError>;

    /// Delete the account
    async fn remove_me(&self, user_id: i64) -> Result<(), UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("User is the only admin of groups with other members")]
    SoleAdmin(Vec<i64>),

    #[error(transparent)]
    Other(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => AppError::NotFound(e.to_string()),
            UserError::WrongPassword => AppError::Unauthorized(e.to_string()),
            UserError::SoleAdmin(_) => AppError::Conflict(e.to_string()),
            UserError::Other(e) => e,
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U, S, G>
where
    U: UserRepository,
    S: SessionRepository,
    G: GroupRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    group_repo: Arc<G>,
    images: Arc<dyn ImageStore>,
    notifications: Arc<dyn NotificationGateway>,
}

impl<U, S, G> UserServiceImpl<U, S, G>
where
    U: UserRepository,
    S: SessionRepository,
    G: GroupRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        group_repo: Arc<G>,
        images: Arc<dyn ImageStore>,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            group_repo,
            images,
            notifications,
        }
    }

    async fn find(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn replace_image(&self, user_id: i64, image: Option<String>) -> Result<User, UserError> {
        let mut user = self.find(user_id).await?;
        if let Err(e) = self.user_repo.set_image(user_id, image.clone()).await {
            discard_image(self.images.as_ref(), image).await;
            return Err(e.into());
        }
        let old = std::mem::replace(&mut user.image, image);
        discard_image(self.images.as_ref(), old).await;
        Ok(user)
    }
}

#[async_trait]
impl<U, S, G> UserService for UserServiceImpl<U, S, G>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    G: GroupRepository + 'static,
{
    async fn get_me(&self, user_id: i64) -> Result<User, UserError> {
        self.find(user_id).await
    }

    async fn get_users(&self, ids: &[i64]) -> Result<Vec<User>, UserError> {
        Ok(self.user_repo.find_by_ids(ids).await?)
    }

    async fn modify_me(&self, user_id: i64, name: &str) -> Result<User, UserError> {
        self.find(user_id).await?;
        Ok(self.user_repo.update_name(user_id, name.trim()).await?)
    }

    async fn change_password(&self, user_id: i64, old_password: &str, new_password: &str) -> Result<(), UserError> {
        let user = self.find(user_id).await?;
        if !verify_password(old_password, &user.password_hash)? {
            return Err(UserError::WrongPassword);
        }

        self.user_repo
            .update_password(user_id, &hash_password(new_password)?)
            .await?;
        let revoked = self.session_repo.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id, revoked, "Password changed, sessions revoked");

        dispatch_notifications(
            self.notifications.as_ref(),
            vec![NewNotification::new(
                user_id,
                NotificationType::UserPasswordChanged,
                json!({}),
            )],
        )
        .await;
        Ok(())
    }

    async fn set_image(&self, user_id: i64, image: Vec<u8>) -> Result<User, UserError> {
        self.find(user_id).await?;
        let path = self.images.store(ImageKind::User, image).await?;
        self.replace_image(user_id, Some(path)).await
    }

    async fn remove_image(&self, user_id: i64) -> Result<User, UserError> {
        self.replace_image(user_id, None).await
    }

    async fn remove_me(&self, user_id: i64) -> Result<(), UserError> {
        let user = self.find(user_id).await?;

        let blocking = self.group_repo.groups_where_sole_admin(user_id).await?;
        if !blocking.is_empty() {
            return Err(UserError::SoleAdmin(blocking));
        }

        self.user_repo.delete(user_id).await?;
        discard_image(self.images.as_ref(), user.image).await;
        tracing::info!(user_id, "User removed");

        // Groups the user was alone in have nobody left to reach them
        for group in self.group_repo.delete_without_members().await? {
            discard_image(self.images.as_ref(), group.image).await;
        }
        Ok(())
    }
}
