//! Health and metrics endpoint tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{json_body, TestApp};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let (status, body) = json_body(app.get("/health", None).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_liveness_check() {
    let app = TestApp::new().await;

    let (status, body) = json_body(app.get("/health/live", None).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "alive"}));
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::new().await;

    let (status, body) = json_body(app.get("/health/ready", None).await).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["database"]["status"], json!("unhealthy"));
}

#[tokio::test]
async fn test_metrics_are_exposed() {
    let app = TestApp::new().await;
    app.get("/health", None).await;

    let response = app.get("/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("shopping_api_http_requests_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
