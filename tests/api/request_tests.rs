//! Request parsing and validation on authenticated routes

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{access_token, json_body, TestApp};

#[tokio::test]
async fn test_malformed_path_id_is_bad_request() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);

    let (status, body) = json_body(app.get("/api/v1/groups/abc/products", Some(&token)).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Invalid group ID"));
}

#[tokio::test]
async fn test_users_lookup_requires_ids() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);

    let (status, body) = json_body(app.get("/api/v1/users", Some(&token)).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], json!("ids"));
}

#[tokio::test]
async fn test_page_items_over_limit_is_invalid() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);

    let (status, body) = json_body(app.get("/api/v1/groups?page_items=500", Some(&token)).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], json!("page_items"));
}

#[tokio::test]
async fn test_filter_text_without_type_is_invalid() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);

    let response = app.get("/api/v1/groups?filter_text=milk", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_amount_is_validated() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);
    let auth = format!("Bearer {}", token);
    let body = json!({"orders": [{"product_id": "1", "amount": 0}]});

    let (status, body) = json_body(
        app.json(
            "POST",
            "/api/v1/groups/1/list-orders/2/orders",
            &body,
            &[("Authorization", &auth)],
        )
        .await,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], json!("orders[0].amount"));
}

#[tokio::test]
async fn test_image_upload_requires_multipart() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);
    let auth = format!("Bearer {}", token);

    let response = app
        .json("PUT", "/api/v1/users/me/image", &json!({}), &[("Authorization", &auth)])
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_unknown_unit_is_a_field_error() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);
    let auth = format!("Bearer {}", token);
    let body = json!({"orders": [{"product_id": "1", "amount": 1, "unit": "parsec"}]});

    let (status, body) = json_body(
        app.json(
            "POST",
            "/api/v1/groups/1/list-orders/2/orders",
            &body,
            &[("Authorization", &auth)],
        )
        .await,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(10007));
    assert_eq!(body["errors"][0]["field"], json!("orders[0].unit"));
}

#[tokio::test]
async fn test_unknown_filter_type_is_a_field_error() {
    let app = TestApp::new().await;
    let token = access_token(7, 15);

    let (status, body) = json_body(
        app.get("/api/v1/groups?filter_text=milk&filter_type=bogus", Some(&token))
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(10007));
    assert_eq!(body["errors"][0]["field"], json!("filter_type"));
}
