//! Group membership rules under concurrent requests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::common::TestApp;

fn statuses(mut results: Vec<StatusCode>) -> Vec<StatusCode> {
    results.sort();
    results
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_personal_groups_create_one(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (_, token, _) = app.register("Ana").await;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let app = app.clone();
            let token = token.clone();
            tokio::spawn(async move {
                let body = json!({"name": "Me", "group_type": "user"});
                app.call("POST", "/api/v1/groups", &token, Some(body)).await.0
            })
        })
        .collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(statuses(results), vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admins_demoting_each_other_keep_one_admin(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (ana, ana_token, _) = app.register("Ana").await;
    let (ben, ben_token, _) = app.register("Ben").await;

    let group = app
        .create("/api/v1/groups", &ana_token, json!({"name": "Flat"}))
        .await;
    let (status, _) = app
        .call(
            "POST",
            &format!("/api/v1/groups/{}/users", group),
            &ana_token,
            Some(json!({"users": [{"user_id": ben, "admin": true}]})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let demote = |token: String, target: String| {
        let app = app.clone();
        let uri = format!("/api/v1/groups/{}/users/{}/role", group, target);
        tokio::spawn(async move { app.call("PUT", &uri, &token, Some(json!({"admin": false}))).await.0 })
    };
    let first = demote(ana_token.clone(), ben.clone());
    let second = demote(ben_token, ana.clone());
    let results = vec![first.await.unwrap(), second.await.unwrap()];

    assert_eq!(statuses(results), vec![StatusCode::NO_CONTENT, StatusCode::CONFLICT]);

    let (_, users) = app
        .call("GET", &format!("/api/v1/groups/{}/users", group), &ana_token, None)
        .await;
    let admins = users["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|member| member["admin"] == json!(true))
        .count();
    assert_eq!(admins, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_last_admin_cannot_leave_a_shared_group(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (ana, ana_token, _) = app.register("Ana").await;
    let (ben, _, _) = app.register("Ben").await;

    let group = app
        .create("/api/v1/groups", &ana_token, json!({"name": "Flat"}))
        .await;
    app.call(
        "POST",
        &format!("/api/v1/groups/{}/users", group),
        &ana_token,
        Some(json!({"users": [{"user_id": ben}]})),
    )
    .await;

    let (status, body) = app
        .call(
            "DELETE",
            &format!("/api/v1/groups/{}/users", group),
            &ana_token,
            Some(json!({"ids": [ana]})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_added_user_is_notified(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (_, ana_token, _) = app.register("Ana").await;
    let (ben, ben_token, _) = app.register("Ben").await;

    let group = app
        .create("/api/v1/groups", &ana_token, json!({"name": "Flat"}))
        .await;
    let (status, _) = app
        .call(
            "POST",
            &format!("/api/v1/groups/{}/users", group),
            &ana_token,
            Some(json!({"users": [{"user_id": ben}]})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.call("GET", "/api/v1/notifications", &ben_token, None).await;
    assert_eq!(status, StatusCode::OK);
    let added: Vec<&Value> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["notification_type"] == json!("group_user_added"))
        .collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["data"]["group_name"], json!("Flat"));
    assert_eq!(added[0]["data"]["group_id"], json!(group));

    let metrics = app.get("/metrics", None).await;
    let bytes = axum::body::to_bytes(metrics.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("shopping_api_notifications_stored_total"));
}
