//! Group Service
//!
//! Handles groups, their members and member roles.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::domain::services::{dispatch_notifications, discard_image, GroupPolicy, ImageStore, NotificationGateway};
use crate::domain::{
    Group, GroupMember, GroupRepository, GroupRole, GroupType, GroupUser, ImageKind, NewNotification,
    NotificationType, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{NameFilter, Page, Pagination};
use crate::shared::snowflake::SnowflakeGenerator;

/// Group service trait
#[async_trait]
pub trait GroupService: Send + Sync {
    /// Create a group; the creator becomes its admin
    async fn create(&self, user_id: i64, group: CreateGroupDto) -> Result<Group, GroupError>;

    /// Groups among `ids` the user belongs to
    async fn get_data(&self, user_id: i64, ids: &[i64]) -> Result<Vec<Group>, GroupError>;

    async fn get_user_groups(
        &self,
        user_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<Group>, GroupError>;

    /// Role of the user in the group
    async fn get_user_role(&self, user_id: i64, group_id: i64) -> Result<GroupRole, GroupError>;

    async fn modify(&self, user_id: i64, group_id: i64, update: UpdateGroupDto) -> Result<Group, GroupError>;

    async fn remove(&self, user_id: i64, group_id: i64) -> Result<(), GroupError>;

    async fn get_users(
        &self,
        user_id: i64,
        group_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<GroupMember>, GroupError>;

    /// Add members; users already in the group are skipped
    async fn add_users(
        &self,
        user_id: i64,
        group_id: i64,
        users: Vec<NewGroupUserDto>,
    ) -> Result<Vec<GroupUser>, GroupError>;

    /// Remove members; returns the removed user IDs
    async fn remove_users(&self, user_id: i64, group_id: i64, user_ids: &[i64]) -> Result<Vec<i64>, GroupError>;

    async fn set_role(&self, user_id: i64, group_id: i64, target_id: i64, admin: bool) -> Result<(), GroupError>;

    async fn set_image(&self, user_id: i64, group_id: i64, image: Vec<u8>) -> Result<Group, GroupError>;

    async fn remove_image(&self, user_id: i64, group_id: i64) -> Result<Group, GroupError>;

    /// Drop groups whose last member left; returns how many went
    async fn remove_orphaned(&self) -> Result<u64, GroupError>;
}

#[derive(Debug, Clone)]
pub struct CreateGroupDto {
    pub name: String,
    pub description: Option<String>,
    pub group_type: GroupType,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateGroupDto {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewGroupUserDto {
    pub user_id: i64,
    pub admin: bool,
}

/// Group service errors
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("Group not found")]
    NotFound,

    #[error("Not a member of this group")]
    NotMember,

    #[error("Only group admins can do this")]
    NotAdmin,

    #[error("Personal groups cannot have other members")]
    UserGroupClosed,

    #[error("Users not found: {0:?}")]
    UsersNotFound(Vec<i64>),

    #[error("User is not a member of this group")]
    MemberNotFound,

    #[error(transparent)]
    Other(#[from] AppError),
}

impl From<GroupError> for AppError {
    fn from(e: GroupError) -> Self {
        match e {
            GroupError::NotFound | GroupError::MemberNotFound | GroupError::UsersNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            GroupError::NotMember | GroupError::NotAdmin => AppError::Forbidden(e.to_string()),
            GroupError::UserGroupClosed => AppError::BadRequest(e.to_string()),
            GroupError::Other(e) => e,
        }
    }
}

/// GroupService implementation
pub struct GroupServiceImpl<G, U>
where
    G: GroupRepository,
    U: UserRepository,
{
    group_repo: Arc<G>,
    user_repo: Arc<U>,
    images: Arc<dyn ImageStore>,
    notifications: Arc<dyn NotificationGateway>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<G, U> GroupServiceImpl<G, U>
where
    G: GroupRepository,
    U: UserRepository,
{
    pub fn new(
        group_repo: Arc<G>,
        user_repo: Arc<U>,
        images: Arc<dyn ImageStore>,
        notifications: Arc<dyn NotificationGateway>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            group_repo,
            user_repo,
            images,
            notifications,
            id_generator,
        }
    }

    /// The group and the caller's membership in it.
    async fn membership(&self, user_id: i64, group_id: i64) -> Result<(Group, GroupUser), GroupError> {
        let group = self
            .group_repo
            .find_by_id(group_id)
            .await?
            .ok_or(GroupError::NotFound)?;
        let member = self
            .group_repo
            .find_member(group_id, user_id)
            .await?
            .ok_or(GroupError::NotMember)?;
        Ok((group, member))
    }

    async fn admin_membership(&self, user_id: i64, group_id: i64) -> Result<Group, GroupError> {
        let (group, member) = self.membership(user_id, group_id).await?;
        if !member.admin {
            return Err(GroupError::NotAdmin);
        }
        Ok(group)
    }

    async fn replace_image(&self, mut group: Group, image: Option<String>) -> Result<Group, GroupError> {
        if let Err(e) = self.group_repo.set_image(group.id, image.clone()).await {
            discard_image(self.images.as_ref(), image).await;
            return Err(e.into());
        }
        let old = std::mem::replace(&mut group.image, image);
        discard_image(self.images.as_ref(), old).await;
        Ok(group)
    }

    fn notifications_for(
        user_ids: impl IntoIterator<Item = i64>,
        notification_type: NotificationType,
        group: &Group,
    ) -> Vec<NewNotification> {
        user_ids
            .into_iter()
            .map(|user_id| {
                NewNotification::new(
                    user_id,
                    notification_type,
                    json!({ "group_id": group.id.to_string(), "group_name": group.name }),
                )
            })
            .collect()
    }
}

#[async_trait]
impl<G, U> GroupService for GroupServiceImpl<G, U>
where
    G: GroupRepository + 'static,
    U: UserRepository + 'static,
{
    async fn create(&self, user_id: i64, request: CreateGroupDto) -> Result<Group, GroupError> {
        let group = Group {
            id: self.id_generator.generate(),
            name: request.name.trim().to_string(),
            description: request.description,
            image: None,
            group_type: request.group_type,
            created_at: Utc::now(),
        };

        let created = self.group_repo.create_with_admin(&group, user_id).await?;
        tracing::info!(group_id = created.id, user_id, "Group created");
        Ok(created)
    }

    async fn get_data(&self, user_id: i64, ids: &[i64]) -> Result<Vec<Group>, GroupError> {
        Ok(self.group_repo.find_by_ids_for_user(user_id, ids).await?)
    }

    async fn get_user_groups(
        &self,
        user_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<Group>, GroupError> {
        Ok(self.group_repo.find_for_user(user_id, filter, pagination).await?)
    }

    async fn get_user_role(&self, user_id: i64, group_id: i64) -> Result<GroupRole, GroupError> {
        self.group_repo
            .find_member(group_id, user_id)
            .await?
            .map(|member| member.role())
            .ok_or(GroupError::NotFound)
    }

    async fn modify(&self, user_id: i64, group_id: i64, update: UpdateGroupDto) -> Result<Group, GroupError> {
        let mut group = self.admin_membership(user_id, group_id).await?;
        if let Some(name) = update.name {
            group.name = name.trim().to_string();
        }
        if update.description.is_some() {
            group.description = update.description;
        }
        Ok(self.group_repo.update(&group).await?)
    }

    async fn remove(&self, user_id: i64, group_id: i64) -> Result<(), GroupError> {
        let group = self.admin_membership(user_id, group_id).await?;
        let members = self.group_repo.member_ids(group_id).await?;

        self.group_repo.delete(group_id).await?;
        discard_image(self.images.as_ref(), group.image.clone()).await;
        tracing::info!(group_id, user_id, "Group removed");

        dispatch_notifications(
            self.notifications.as_ref(),
            Self::notifications_for(members, NotificationType::GroupRemoved, &group),
        )
        .await;
        Ok(())
    }

    async fn get_users(
        &self,
        user_id: i64,
        group_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<GroupMember>, GroupError> {
        self.membership(user_id, group_id).await?;
        Ok(self.group_repo.find_members(group_id, filter, pagination).await?)
    }

    async fn add_users(
        &self,
        user_id: i64,
        group_id: i64,
        users: Vec<NewGroupUserDto>,
    ) -> Result<Vec<GroupUser>, GroupError> {
        let group = self.admin_membership(user_id, group_id).await?;
        if !group.accepts_new_members() {
            return Err(GroupError::UserGroupClosed);
        }

        let ids: Vec<i64> = users.iter().map(|u| u.user_id).collect();
        let found: HashSet<i64> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        let missing: Vec<i64> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(GroupError::UsersNotFound(missing));
        }

        let existing: HashSet<i64> = self
            .group_repo
            .find_memberships(group_id, &ids)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        let now = Utc::now();
        let new_members: Vec<GroupUser> = users
            .into_iter()
            .filter(|u| !existing.contains(&u.user_id))
            .map(|u| GroupUser {
                group_id,
                user_id: u.user_id,
                admin: u.admin,
                joined_at: now,
            })
            .collect();
        if new_members.is_empty() {
            return Ok(Vec::new());
        }

        let added = self.group_repo.add_members(group_id, &new_members).await?;
        tracing::info!(group_id, added = added.len(), "Users added to group");

        dispatch_notifications(
            self.notifications.as_ref(),
            Self::notifications_for(
                added.iter().map(|m| m.user_id),
                NotificationType::GroupUserAdded,
                &group,
            ),
        )
        .await;
        Ok(added)
    }

    async fn remove_users(&self, user_id: i64, group_id: i64, user_ids: &[i64]) -> Result<Vec<i64>, GroupError> {
        let (group, actor) = self.membership(user_id, group_id).await?;
        if !GroupPolicy::can_remove(&actor, user_ids) {
            return Err(GroupError::NotAdmin);
        }

        let targets = self.group_repo.find_memberships(group_id, user_ids).await?;
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let target_ids: Vec<i64> = targets.iter().map(|m| m.user_id).collect();
        let removed = self.group_repo.remove_members(group_id, &target_ids).await?;
        tracing::info!(group_id, removed = removed.len(), "Users removed from group");

        dispatch_notifications(
            self.notifications.as_ref(),
            Self::notifications_for(
                removed.iter().copied().filter(|id| *id != user_id),
                NotificationType::GroupUserRemoved,
                &group,
            ),
        )
        .await;
        Ok(removed)
    }

    async fn set_role(&self, user_id: i64, group_id: i64, target_id: i64, admin: bool) -> Result<(), GroupError> {
        let group = self.admin_membership(user_id, group_id).await?;
        let target = self
            .group_repo
            .find_member(group_id, target_id)
            .await?
            .ok_or(GroupError::MemberNotFound)?;
        if target.admin == admin {
            return Ok(());
        }

        self.group_repo.set_admin(group_id, target_id, admin).await?;

        if admin {
            dispatch_notifications(
                self.notifications.as_ref(),
                Self::notifications_for([target_id], NotificationType::GroupUserSetAsAdmin, &group),
            )
            .await;
        }
        Ok(())
    }

    async fn set_image(&self, user_id: i64, group_id: i64, image: Vec<u8>) -> Result<Group, GroupError> {
        let group = self.admin_membership(user_id, group_id).await?;
        let path = self.images.store(ImageKind::Group, image).await?;
        self.replace_image(group, Some(path)).await
    }

    async fn remove_image(&self, user_id: i64, group_id: i64) -> Result<Group, GroupError> {
        let group = self.admin_membership(user_id, group_id).await?;
        self.replace_image(group, None).await
    }

    async fn remove_orphaned(&self) -> Result<u64, GroupError> {
        let removed = self.group_repo.delete_without_members().await?;
        for group in &removed {
            discard_image(self.images.as_ref(), group.image.clone()).await;
        }
        Ok(removed.len() as u64)
    }
}
