//! Group Repository Implementation
//!
//! PostgreSQL implementation of the GroupRepository trait over the
//! `groups` and `group_users` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::domain::services::GroupPolicy;
use crate::domain::{Group, GroupMember, GroupRepository, GroupType, GroupUser};
use crate::shared::error::{map_db_error, AppError};
use crate::shared::pagination::{like_pattern, NameFilter, Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    description: Option<String>,
    image: Option<String>,
    group_type: String,
    created_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self) -> Group {
        Group {
            id: self.id,
            name: self.name,
            description: self.description,
            image: self.image,
            group_type: self.group_type.parse().unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GroupUserRow {
    group_id: i64,
    user_id: i64,
    admin: bool,
    joined_at: DateTime<Utc>,
}

impl GroupUserRow {
    fn into_group_user(self) -> GroupUser {
        GroupUser {
            group_id: self.group_id,
            user_id: self.user_id,
            admin: self.admin,
            joined_at: self.joined_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    user_id: i64,
    name: String,
    image: Option<String>,
    admin: bool,
    joined_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> GroupMember {
        GroupMember {
            user_id: self.user_id,
            name: self.name,
            image: self.image,
            admin: self.admin,
            joined_at: self.joined_at,
        }
    }
}

const GROUP_COLUMNS: &str = "g.id, g.name, g.description, g.image, g.group_type, g.created_at";

/// Lock the group row for the rest of the transaction.
///
/// Membership writes that check counts first serialize on this lock.
async fn lock_group(conn: &mut PgConnection, group_id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM groups WHERE id = $1 FOR UPDATE")
        .bind(group_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group with id {} not found", group_id)))?;
    Ok(())
}

/// Members and admins of a group.
async fn member_counts(conn: &mut PgConnection, group_id: i64) -> Result<(i64, i64), AppError> {
    let counts = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE admin) FROM group_users WHERE group_id = $1",
    )
    .bind(group_id)
    .fetch_one(conn)
    .await?;

    Ok(counts)
}

/// PostgreSQL group repository implementation.
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!("SELECT {} FROM groups g WHERE g.id = $1", GROUP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_group()))
    }

    async fn find_by_ids_for_user(&self, user_id: i64, ids: &[i64]) -> Result<Vec<Group>, AppError> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            SELECT {}
            FROM groups g
            JOIN group_users gu ON gu.group_id = g.id
            WHERE gu.user_id = $1 AND g.id = ANY($2)
            ORDER BY g.name
            "#,
            GROUP_COLUMNS
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_group()).collect())
    }

    async fn find_for_user(
        &self,
        user_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<Group>, AppError> {
        let pattern = like_pattern(filter.as_ref());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM groups g
            JOIN group_users gu ON gu.group_id = g.id
            WHERE gu.user_id = $1 AND g.name ILIKE $2 ESCAPE '\'
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            SELECT {}
            FROM groups g
            JOIN group_users gu ON gu.group_id = g.id
            WHERE gu.user_id = $1 AND g.name ILIKE $2 ESCAPE '\'
            ORDER BY g.name, g.id
            LIMIT $3 OFFSET $4
            "#,
            GROUP_COLUMNS
        ))
        .bind(user_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(|r| r.into_group()).collect(), total))
    }

    async fn create_with_admin(&self, group: &Group, admin_user_id: i64) -> Result<Group, AppError> {
        let mut tx = self.pool.begin().await?;

        if group.group_type == GroupType::User {
            sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(admin_user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;

            let owned = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM groups g
                    JOIN group_users gu ON gu.group_id = g.id
                    WHERE gu.user_id = $1 AND gu.admin AND g.group_type = 'user'
                )
                "#,
            )
            .bind(admin_user_id)
            .fetch_one(&mut *tx)
            .await?;
            GroupPolicy::check_personal_group(owned)?;
        }

        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO groups (id, name, description, image, group_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, image, group_type, created_at
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(&group.image)
        .bind(group.group_type.as_str())
        .bind(group.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Group already exists", "User not found"))?;

        sqlx::query("INSERT INTO group_users (group_id, user_id, admin, joined_at) VALUES ($1, $2, TRUE, $3)")
            .bind(group.id)
            .bind(admin_user_id)
            .bind(group.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Already a member", "User not found"))?;

        tx.commit().await?;
        Ok(row.into_group())
    }

    async fn update(&self, group: &Group) -> Result<Group, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            UPDATE groups SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description, image, group_type, created_at
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group with id {} not found", group.id)))?;

        Ok(row.into_group())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Group with id {} not found", id)));
        }
        Ok(())
    }

    async fn set_image(&self, id: i64, image: Option<String>) -> Result<(), AppError> {
        sqlx::query("UPDATE groups SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_member(&self, group_id: i64, user_id: i64) -> Result<Option<GroupUser>, AppError> {
        let row = sqlx::query_as::<_, GroupUserRow>(
            "SELECT group_id, user_id, admin, joined_at FROM group_users WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_group_user()))
    }

    async fn find_members(
        &self,
        group_id: i64,
        filter: Option<NameFilter>,
        pagination: Pagination,
    ) -> Result<Page<GroupMember>, AppError> {
        let pattern = like_pattern(filter.as_ref());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM group_users gu
            JOIN users u ON u.id = gu.user_id
            WHERE gu.group_id = $1 AND u.name ILIKE $2 ESCAPE '\'
            "#,
        )
        .bind(group_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT gu.user_id, u.name, u.image, gu.admin, gu.joined_at
            FROM group_users gu
            JOIN users u ON u.id = gu.user_id
            WHERE gu.group_id = $1 AND u.name ILIKE $2 ESCAPE '\'
            ORDER BY u.name, gu.user_id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(group_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(|r| r.into_member()).collect(), total))
    }

    async fn find_memberships(&self, group_id: i64, user_ids: &[i64]) -> Result<Vec<GroupUser>, AppError> {
        let rows = sqlx::query_as::<_, GroupUserRow>(
            r#"
            SELECT group_id, user_id, admin, joined_at
            FROM group_users
            WHERE group_id = $1 AND user_id = ANY($2)
            "#,
        )
        .bind(group_id)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_group_user()).collect())
    }

    async fn member_ids(&self, group_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT user_id FROM group_users WHERE group_id = $1")
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn add_members(&self, group_id: i64, members: &[GroupUser]) -> Result<Vec<GroupUser>, AppError> {
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
        let admins: Vec<bool> = members.iter().map(|m| m.admin).collect();
        let joined: Vec<DateTime<Utc>> = members.iter().map(|m| m.joined_at).collect();

        let mut tx = self.pool.begin().await?;
        lock_group(&mut tx, group_id).await?;

        let (members_total, _) = member_counts(&mut tx, group_id).await?;
        let already_in = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM group_users WHERE group_id = $1 AND user_id = ANY($2)",
        )
        .bind(group_id)
        .bind(&user_ids)
        .fetch_one(&mut *tx)
        .await?;
        GroupPolicy::check_capacity(members_total, members.len().saturating_sub(already_in as usize))?;

        let rows = sqlx::query_as::<_, GroupUserRow>(
            r#"
            INSERT INTO group_users (group_id, user_id, admin, joined_at)
            SELECT $1::BIGINT, * FROM UNNEST($2::BIGINT[], $3::BOOLEAN[], $4::TIMESTAMPTZ[])
            ON CONFLICT (group_id, user_id) DO NOTHING
            RETURNING group_id, user_id, admin, joined_at
            "#,
        )
        .bind(group_id)
        .bind(&user_ids)
        .bind(&admins)
        .bind(&joined)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Already a member", "User or group not found"))?;

        tx.commit().await?;
        Ok(rows.into_iter().map(|r| r.into_group_user()).collect())
    }

    async fn remove_members(&self, group_id: i64, user_ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_group(&mut tx, group_id).await?;

        let targets = sqlx::query_as::<_, GroupUserRow>(
            r#"
            SELECT group_id, user_id, admin, joined_at
            FROM group_users
            WHERE group_id = $1 AND user_id = ANY($2)
            "#,
        )
        .bind(group_id)
        .bind(user_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|r| r.into_group_user())
        .collect::<Vec<_>>();

        let (members_total, admins_total) = member_counts(&mut tx, group_id).await?;
        GroupPolicy::check_removal(&targets, members_total, admins_total)?;

        let removed = sqlx::query_scalar::<_, i64>(
            "DELETE FROM group_users WHERE group_id = $1 AND user_id = ANY($2) RETURNING user_id",
        )
        .bind(group_id)
        .bind(user_ids)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(removed)
    }

    async fn set_admin(&self, group_id: i64, user_id: i64, admin: bool) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        lock_group(&mut tx, group_id).await?;

        let target = sqlx::query_as::<_, GroupUserRow>(
            "SELECT group_id, user_id, admin, joined_at FROM group_users WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".into()))?
        .into_group_user();

        let (_, admins_total) = member_counts(&mut tx, group_id).await?;
        GroupPolicy::check_role_change(&target, admin, admins_total)?;

        sqlx::query("UPDATE group_users SET admin = $3 WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .bind(admin)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_without_members(&self) -> Result<Vec<Group>, AppError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            DELETE FROM groups g
            WHERE NOT EXISTS (SELECT 1 FROM group_users gu WHERE gu.group_id = g.id)
            RETURNING id, name, description, image, group_type, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_group()).collect())
    }

    async fn groups_where_sole_admin(&self, user_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT gu.group_id
            FROM group_users gu
            WHERE gu.user_id = $1
              AND gu.admin
              AND (SELECT COUNT(*) FROM group_users a WHERE a.group_id = gu.group_id AND a.admin) = 1
              AND (SELECT COUNT(*) FROM group_users m WHERE m.group_id = gu.group_id) > 1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
