//! Authentication API Tests
//!
//! Everything here is rejected before the database is reached.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{access_token, json_body, TestApp};

#[tokio::test]
async fn test_register_with_invalid_data_fails() {
    let app = TestApp::new().await;
    let body = json!({
        "name": "A",
        "email": "not-an-email",
        "password": "short"
    });

    let (status, body) = json_body(app.json("POST", "/api/v1/auth/register", &body, &[]).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(10007));
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "name", "password"]);
}

#[tokio::test]
async fn test_login_with_malformed_json_fails() {
    let app = TestApp::new().await;

    let (status, body) = json_body(app.json("POST", "/api/v1/auth/login", &json!({"email": 1}), &[]).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(10002));
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;

    let (status, body) = json_body(app.get("/api/v1/users/me", None).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(10003));
    assert_eq!(body["message"], json!("Missing authorization header"));
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = json_body(app.get("/api/v1/groups", Some("not-a-jwt")).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid token"));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new().await;
    let token = access_token(42, -10);

    let (status, body) = json_body(app.get("/api/v1/notifications", Some(&token)).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Token expired"));
}

#[tokio::test]
async fn test_public_share_route_needs_no_token() {
    let app = TestApp::new().await;

    // Malformed tokens never reach the database
    let (status, body) = json_body(app.get("/api/v1/shares/not-a-uuid", None).await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(10001));
}
