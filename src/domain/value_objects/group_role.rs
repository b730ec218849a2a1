//! Member role inside a group.

use serde::{Deserialize, Serialize};

/// Role of a user in a group. Admins manage the group and its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Admin,
    User,
}

impl GroupRole {
    pub fn from_admin(admin: bool) -> Self {
        if admin {
            Self::Admin
        } else {
            Self::User
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}
