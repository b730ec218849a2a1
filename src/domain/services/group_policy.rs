//! Membership rules of groups.

use crate::domain::entities::{GroupUser, MAX_GROUP_USERS};
use crate::shared::error::AppError;

/// Domain service holding the rules that keep a group administrable.
pub struct GroupPolicy;

impl GroupPolicy {
    /// Admins may remove anyone; other members only themselves.
    pub fn can_remove(actor: &GroupUser, user_ids: &[i64]) -> bool {
        actor.admin || user_ids.iter().all(|id| *id == actor.user_id)
    }

    /// A group never grows beyond [`MAX_GROUP_USERS`].
    pub fn check_capacity(members_total: i64, adding: usize) -> Result<(), AppError> {
        if members_total + adding as i64 > MAX_GROUP_USERS {
            return Err(AppError::Conflict(format!(
                "A group cannot have more than {} users",
                MAX_GROUP_USERS
            )));
        }
        Ok(())
    }

    /// Removing `removed` must leave an admin behind while anybody remains.
    pub fn check_removal(removed: &[GroupUser], members_total: i64, admins_total: i64) -> Result<(), AppError> {
        let removed_admins = removed.iter().filter(|m| m.admin).count() as i64;
        let members_left = members_total - removed.len() as i64;
        let admins_left = admins_total - removed_admins;

        if members_left > 0 && admins_left <= 0 {
            return Err(AppError::Conflict(
                "The last admin of a group cannot be removed".into(),
            ));
        }
        Ok(())
    }

    /// A user owns at most one `user` group.
    pub fn check_personal_group(already_owned: bool) -> Result<(), AppError> {
        if already_owned {
            return Err(AppError::Conflict("User already owns a personal group".into()));
        }
        Ok(())
    }

    /// Demoting the only admin is not allowed.
    pub fn check_role_change(target: &GroupUser, admin: bool, admins_total: i64) -> Result<(), AppError> {
        if target.admin && !admin && admins_total <= 1 {
            return Err(AppError::Conflict(
                "The last admin of a group cannot be demoted".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use test_case::test_case;

    fn member(user_id: i64, admin: bool) -> GroupUser {
        GroupUser {
            group_id: 1,
            user_id,
            admin,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_can_remove_anyone() {
        assert!(GroupPolicy::can_remove(&member(1, true), &[2, 3]));
    }

    #[test]
    fn test_member_can_only_remove_self() {
        assert!(GroupPolicy::can_remove(&member(2, false), &[2]));
        assert!(!GroupPolicy::can_remove(&member(2, false), &[2, 3]));
    }

    #[test_case(99, 1, true ; "fills the group")]
    #[test_case(100, 1, false ; "over the limit")]
    #[test_case(50, 51, false ; "batch over the limit")]
    fn test_capacity(total: i64, adding: usize, ok: bool) {
        assert_eq!(GroupPolicy::check_capacity(total, adding).is_ok(), ok);
    }

    #[test]
    fn test_last_admin_cannot_leave_others_behind() {
        let err = GroupPolicy::check_removal(&[member(1, true)], 3, 1).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_last_member_may_leave() {
        assert!(GroupPolicy::check_removal(&[member(1, true)], 1, 1).is_ok());
    }

    #[test]
    fn test_admin_may_leave_when_another_admin_remains() {
        assert!(GroupPolicy::check_removal(&[member(1, true)], 3, 2).is_ok());
    }

    #[test]
    fn test_personal_group_is_unique() {
        assert!(GroupPolicy::check_personal_group(false).is_ok());
        assert!(matches!(GroupPolicy::check_personal_group(true), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_role_change() {
        assert!(GroupPolicy::check_role_change(&member(1, true), false, 1).is_err());
        assert!(GroupPolicy::check_role_change(&member(1, true), false, 2).is_ok());
        assert!(GroupPolicy::check_role_change(&member(2, false), true, 1).is_ok());
    }
}
