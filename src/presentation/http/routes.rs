//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, create_cors_layer, create_trace_layer, internal_key_middleware, track_metrics,
};
use crate::startup::AppState;

/// Room for multipart framing around an image at the size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let settings = state.settings.clone();
    let body_limit = settings.uploads.max_size_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .nest_service(&settings.uploads.public_url, ServeDir::new(&settings.uploads.dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(create_cors_layer(&settings.cors))
        .layer(create_trace_layer())
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/internal", internal_routes(state.clone()))
        .route("/shares/{token}", get(handlers::share::get_shared))
        .merge(protected_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
}

/// Endpoints other modules call with the shared key
fn internal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            post(handlers::notification::create_notifications),
        )
        .route_layer(middleware::from_fn_with_state(state, internal_key_middleware))
}

/// Everything behind a bearer token
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/groups", group_routes())
        .nest("/shares", share_routes())
        .nest("/notifications", notification_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn user_routes() -> Router<AppState> {
    use handlers::user;

    Router::new()
        .route("/", get(user::get_users))
        .route(
            "/me",
            get(user::get_me).patch(user::modify_me).delete(user::remove_me),
        )
        .route("/me/password", put(user::change_password))
        .route("/me/image", put(user::set_image).delete(user::remove_image))
}

fn group_routes() -> Router<AppState> {
    use handlers::{group, list_orders, order, product, share, shop};

    Router::new()
        .route("/", post(group::create_group).get(group::get_user_groups))
        .route("/data", get(group::get_groups_data))
        .route(
            "/{group_id}",
            get(group::get_group)
                .patch(group::modify_group)
                .delete(group::remove_group),
        )
        .route("/{group_id}/role", get(group::get_user_role))
        .route(
            "/{group_id}/users",
            get(group::get_group_users)
                .post(group::add_group_users)
                .delete(group::remove_group_users),
        )
        .route("/{group_id}/users/{user_id}/role", put(group::set_user_role))
        .route(
            "/{group_id}/image",
            put(group::set_group_image).delete(group::remove_group_image),
        )
        // Products
        .route(
            "/{group_id}/products",
            post(product::create_product)
                .get(product::get_products)
                .delete(product::remove_products),
        )
        .route("/{group_id}/products/shops", get(product::get_shop_prices))
        .route("/{group_id}/products/{product_id}", patch(product::modify_product))
        .route(
            "/{group_id}/products/{product_id}/shops",
            put(product::set_shop_prices).get(product::get_product_shop_prices),
        )
        .route(
            "/{group_id}/products/{product_id}/image",
            put(product::set_product_image).delete(product::remove_product_image),
        )
        // Shops
        .route(
            "/{group_id}/shops",
            post(shop::create_shop)
                .get(shop::get_shops)
                .delete(shop::remove_shops),
        )
        .route("/{group_id}/shops/{shop_id}", patch(shop::modify_shop))
        .route(
            "/{group_id}/shops/{shop_id}/image",
            put(shop::set_shop_image).delete(shop::remove_shop_image),
        )
        // Lists
        .route(
            "/{group_id}/list-orders",
            post(list_orders::create_list_orders)
                .get(list_orders::get_list_orders)
                .delete(list_orders::remove_list_orders),
        )
        .route(
            "/{group_id}/list-orders/{list_orders_id}",
            patch(list_orders::modify_list_orders),
        )
        .route(
            "/{group_id}/list-orders/{list_orders_id}/copy",
            post(list_orders::copy_list_orders),
        )
        .route(
            "/{group_id}/list-orders/{list_orders_id}/price",
            get(list_orders::get_list_orders_price),
        )
        .route(
            "/{group_id}/list-orders/{list_orders_id}/orders",
            post(order::create_orders).get(order::get_list_orders_orders),
        )
        .route(
            "/{group_id}/list-orders/{list_orders_id}/share",
            post(share::create_share),
        )
        // Orders
        .route(
            "/{group_id}/orders",
            get(order::get_orders).delete(order::remove_orders),
        )
        .route("/{group_id}/orders/{order_id}", patch(order::modify_order))
        .route("/{group_id}/orders/{order_id}/bought", put(order::set_order_bought))
}

fn share_routes() -> Router<AppState> {
    use handlers::share;

    Router::new().route(
        "/",
        get(share::get_user_shares).delete(share::remove_shares),
    )
}

fn notification_routes() -> Router<AppState> {
    use handlers::notification;

    Router::new()
        .route(
            "/",
            get(notification::get_notifications).delete(notification::remove_notifications),
        )
        .route("/unread", get(notification::get_unread_count))
        .route("/viewed", put(notification::mark_viewed))
}
