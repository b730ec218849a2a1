//! Refresh token rotation against the sessions table

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::common::{json_body, TestApp};

async fn refresh(app: &TestApp, token: &str) -> (StatusCode, Value) {
    json_body(
        app.json("POST", "/api/v1/auth/refresh", &json!({"refresh_token": token}), &[])
            .await,
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_rotates_the_token(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (_, _, first) = app.register("Ana").await;

    let (status, body) = refresh(&app, &first).await;
    assert_eq!(status, StatusCode::OK);
    let second = body["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(second, first);

    let (status, body) = refresh(&app, &first).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(10003));

    let (status, _) = refresh(&app, &second).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_refreshes_redeem_a_token_once(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (_, _, token) = app.register("Ana").await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let app = app.clone();
            let token = token.clone();
            tokio::spawn(async move { refresh(&app, &token).await })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        match status {
            StatusCode::OK => winners.push(body["refresh_token"].as_str().unwrap().to_string()),
            other => assert_eq!(other, StatusCode::UNAUTHORIZED),
        }
    }

    assert_eq!(winners.len(), 1);
    let (status, _) = refresh(&app, &winners[0]).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_revokes_the_session(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (_, _, token) = app.register("Ana").await;

    let response = app
        .json("POST", "/api/v1/auth/logout", &json!({"refresh_token": token}), &[])
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = refresh(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
