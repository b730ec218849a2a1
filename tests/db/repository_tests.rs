//! Repository statements run against PostgreSQL

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::PgPool;

use shopping_api::domain::{
    GroupRepository, GroupUser, Notification, NotificationRepository, NotificationType, Session, SessionRepository,
    ShareListOrders, ShareRepository,
};
use shopping_api::infrastructure::repositories::{
    PgGroupRepository, PgNotificationRepository, PgSessionRepository, PgShareRepository,
};
use shopping_api::shared::error::AppError;
use shopping_api::shared::pagination::Pagination;

/// Users `first..=last`, named after their ID.
async fn seed_users(pool: &PgPool, first: i64, last: i64) {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash)
        SELECT n, 'User ' || n, 'user' || n || '@example.com', 'hash'
        FROM generate_series($1::BIGINT, $2::BIGINT) AS n
        "#,
    )
    .bind(first)
    .bind(last)
    .execute(pool)
    .await
    .unwrap();
}

/// Group `id` administered by `admin`.
async fn seed_group(pool: &PgPool, id: i64, admin: i64) {
    sqlx::query("INSERT INTO groups (id, name) VALUES ($1, 'Flat')")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO group_users (group_id, user_id, admin) VALUES ($1, $2, TRUE)")
        .bind(id)
        .bind(admin)
        .execute(pool)
        .await
        .unwrap();
}

fn members(group_id: i64, user_ids: impl IntoIterator<Item = i64>) -> Vec<GroupUser> {
    user_ids
        .into_iter()
        .map(|user_id| GroupUser {
            group_id,
            user_id,
            admin: false,
            joined_at: Utc::now(),
        })
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rotate_token_succeeds_once(pool: PgPool) {
    seed_users(&pool, 1, 1).await;
    let repo = PgSessionRepository::new(pool);
    let session = repo
        .create(&Session::new(1, "first".into(), Utc::now() + Duration::days(7)))
        .await
        .unwrap();
    let expires_at = Utc::now() + Duration::days(7);

    assert!(repo.rotate_token(session.id, "first", "second", expires_at).await.unwrap());
    assert!(!repo.rotate_token(session.id, "first", "third", expires_at).await.unwrap());
    assert!(repo.find_by_token_hash("first").await.unwrap().is_none());

    repo.revoke(session.id).await.unwrap();
    assert!(!repo.rotate_token(session.id, "second", "fourth", expires_at).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_stale_sessions(pool: PgPool) {
    seed_users(&pool, 1, 1).await;
    let repo = PgSessionRepository::new(pool);
    let live = repo
        .create(&Session::new(1, "live".into(), Utc::now() + Duration::days(7)))
        .await
        .unwrap();
    repo.create(&Session::new(1, "expired".into(), Utc::now() - Duration::minutes(1)))
        .await
        .unwrap();
    let revoked = repo
        .create(&Session::new(1, "revoked".into(), Utc::now() + Duration::days(7)))
        .await
        .unwrap();
    repo.revoke(revoked.id).await.unwrap();

    assert_eq!(repo.delete_stale().await.unwrap(), 2);
    assert_eq!(repo.find_by_token_hash("live").await.unwrap().map(|s| s.id), Some(live.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notifications_keep_their_data(pool: PgPool) {
    seed_users(&pool, 1, 2).await;
    let repo = PgNotificationRepository::new(pool);
    let old = Utc::now() - Duration::days(100);
    let rows = vec![
        Notification {
            id: 10,
            user_id: 1,
            notification_type: NotificationType::GroupUserAdded,
            data: json!({"group_id": "7", "group_name": "Flat"}),
            viewed: false,
            created_at: Utc::now(),
        },
        Notification {
            id: 11,
            user_id: 2,
            notification_type: NotificationType::UserRegistered,
            data: json!({}),
            viewed: false,
            created_at: old,
        },
    ];

    let created = repo.create_many(&rows).await.unwrap();
    assert_eq!(created.len(), 2);

    let page = repo.find_for_user(1, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].notification_type, NotificationType::GroupUserAdded);
    assert_eq!(page.items[0].data["group_name"], json!("Flat"));
    assert_eq!(repo.count_unread(1).await.unwrap(), 1);

    let removed = repo.delete_older_than(Utc::now() - Duration::days(90)).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(repo.find_for_user(2, Pagination::default()).await.unwrap().total, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_expired_shares(pool: PgPool) {
    seed_users(&pool, 1, 1).await;
    seed_group(&pool, 5, 1).await;
    sqlx::query("INSERT INTO list_orders (id, group_id, user_id, name) VALUES (20, 5, 1, 'Weekly')")
        .execute(&pool)
        .await
        .unwrap();
    let repo = PgShareRepository::new(pool);

    let live = repo
        .create(&ShareListOrders::new(20, 5, 1, Duration::days(7)))
        .await
        .unwrap();
    let expired = repo
        .create(&ShareListOrders::new(20, 5, 1, Duration::minutes(-1)))
        .await
        .unwrap();

    assert_eq!(repo.delete_expired().await.unwrap(), 1);
    assert!(repo.find_by_id(live.id).await.unwrap().is_some());
    assert!(repo.find_by_id(expired.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_members_stops_at_capacity(pool: PgPool) {
    seed_users(&pool, 1, 101).await;
    seed_group(&pool, 5, 1).await;
    let repo = PgGroupRepository::new(pool);

    let added = repo.add_members(5, &members(5, 2..=100)).await.unwrap();
    assert_eq!(added.len(), 99);

    // Existing members don't count towards the new total
    let added = repo.add_members(5, &members(5, [1, 2])).await.unwrap();
    assert!(added.is_empty());

    let result = repo.add_members(5, &members(5, [101])).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(repo.member_ids(5).await.unwrap().len(), 100);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_last_admin_is_kept(pool: PgPool) {
    seed_users(&pool, 1, 2).await;
    seed_group(&pool, 5, 1).await;
    let repo = PgGroupRepository::new(pool);
    repo.add_members(5, &members(5, [2])).await.unwrap();

    assert!(matches!(repo.set_admin(5, 1, false).await, Err(AppError::Conflict(_))));
    assert!(matches!(repo.remove_members(5, &[1]).await, Err(AppError::Conflict(_))));

    repo.set_admin(5, 2, true).await.unwrap();
    assert_eq!(repo.remove_members(5, &[1]).await.unwrap(), vec![1]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_without_members(pool: PgPool) {
    seed_users(&pool, 1, 1).await;
    seed_group(&pool, 5, 1).await;
    sqlx::query("INSERT INTO groups (id, name) VALUES (6, 'Empty')")
        .execute(&pool)
        .await
        .unwrap();
    let repo = PgGroupRepository::new(pool);

    let removed = repo.delete_without_members().await.unwrap();
    assert_eq!(removed.iter().map(|g| g.id).collect::<Vec<_>>(), vec![6]);
    assert!(repo.find_by_id(5).await.unwrap().is_some());
}
