//! Group entity, membership and repository trait.
//!
//! Maps to the `groups` and `group_users` tables. Every product, shop,
//! list of orders and order belongs to exactly one group.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::GroupRole;
use crate::shared::error::AppError;
use crate::shared::pagination::{NameFilter, Page, Pagination};

/// Maximum number of members a group may hold.
pub const MAX_GROUP_USERS: i64 = 100;

/// Kind of group.
///
/// A `user` group is the private space of one user: it never gets other members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    #[default]
    Group,
    User,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::User => "user",
        }
    }
}

impl FromStr for GroupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(Self::Group),
            "user" => Ok(Self::User),
            other => Err(format!("Unknown group type '{}'", other)),
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a group of users sharing lists, products and shops.
///
/// Maps to the `groups` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(50) NOT NULL
/// - description: VARCHAR(500) NULL
/// - image: TEXT NULL
/// - group_type: VARCHAR(10) NOT NULL CHECK (group_type IN ('group', 'user'))
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub group_type: GroupType,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn accepts_new_members(&self) -> bool {
        self.group_type == GroupType::Group
    }
}

/// A user's membership in a group (`group_users` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUser {
    pub group_id: i64,
    pub user_id: i64,
    pub admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl GroupUser {
    pub fn role(&self) -> GroupRole {
        GroupRole::from_admin(self.admin)
    }
}

/// Member listing row: membership joined with the user's public profile.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub user_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub admin: bool,
    pub joined_at: DateTime<Utc>,
}

/// Repository trait for Group data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Find a group by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError>;

    /// Groups among `ids` the user belongs to.
    async fn find_by_ids_for_user(&self, user_id: i64, ids: &[i64]) -> Result<Vec<Group>, AppError>;

    /// Page of the user's groups, optionally filtered by name.
    async fn find_for_user(
        &self,
        user_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<Group>, AppError>;

    /// Insert the group and its first admin in one transaction.
    ///
    /// The creator's user row is locked for `user` groups, so a user never
    /// ends up owning two of them (409).
    async fn create_with_admin(&self, group: &Group, admin_user_id: i64) -> Result<Group, AppError>;

    /// Update name and description.
    async fn update(&self, group: &Group) -> Result<Group, AppError>;

    /// Delete a group; everything owned by it cascades.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Set or clear the group image.
    async fn set_image(&self, id: i64, image: Option<String>) -> Result<(), AppError>;

    /// Membership of a user in a group.
    async fn find_member(&self, group_id: i64, user_id: i64) -> Result<Option<GroupUser>, AppError>;

    /// Page of members, filtered by user name.
    async fn find_members(
        &self,
        group_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<GroupMember>, AppError>;

    /// Memberships for the given users (missing ones skipped).
    async fn find_memberships(&self, group_id: i64, user_ids: &[i64]) -> Result<Vec<GroupUser>, AppError>;

    /// IDs of every member.
    async fn member_ids(&self, group_id: i64) -> Result<Vec<i64>, AppError>;

    /// Insert memberships; existing members are left untouched.
    ///
    /// The member limit is checked under a lock on the group row (409).
    async fn add_members(&self, group_id: i64, members: &[GroupUser]) -> Result<Vec<GroupUser>, AppError>;

    /// Remove memberships; returns the removed user IDs.
    ///
    /// Refused with 409 when it would leave members without an admin.
    async fn remove_members(&self, group_id: i64, user_ids: &[i64]) -> Result<Vec<i64>, AppError>;

    /// Grant or revoke admin; demoting the last admin is refused with 409.
    async fn set_admin(&self, group_id: i64, user_id: i64, admin: bool) -> Result<(), AppError>;

    /// Delete every group that has no members left; returns them.
    async fn delete_without_members(&self) -> Result<Vec<Group>, AppError>;

    /// Groups with other members where the user is the only admin.
    async fn groups_where_sole_admin(&self, user_id: i64) -> Result<Vec<i64>, AppError>;
}
