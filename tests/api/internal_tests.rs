//! Internal endpoint tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{json_body, TestApp, MODULE_KEY};

const PATH: &str = "/api/v1/internal/notifications";

#[tokio::test]
async fn test_missing_module_key_is_forbidden() {
    let app = TestApp::new().await;
    let body = json!({"notifications": [{"user_id": "1", "notification_type": "group_removed"}]});

    let (status, body) = json_body(app.json("POST", PATH, &body, &[]).await).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!(10004));
}

#[tokio::test]
async fn test_wrong_module_key_is_forbidden() {
    let app = TestApp::new().await;
    let body = json!({"notifications": []});

    let response = app
        .json("POST", PATH, &body, &[("X-Module-Key", "some-other-key-value")])
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_empty_notification_batch_is_invalid() {
    let app = TestApp::new().await;
    let body = json!({"notifications": []});

    let (status, body) = json_body(app.json("POST", PATH, &body, &[("X-Module-Key", MODULE_KEY)]).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], json!("notifications"));
}

#[tokio::test]
async fn test_unknown_notification_type_is_rejected() {
    let app = TestApp::new().await;
    let body = json!({"notifications": [{"user_id": "1", "notification_type": "party_started"}]});

    let response = app
        .json("POST", PATH, &body, &[("X-Module-Key", MODULE_KEY)])
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
