//! Notification Handlers

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateNotificationsRequest, IdsRequest, ListQuery};
use crate::application::dto::response::{
    CreatedCountResponse, IdsResponse, NotificationResponse, UnreadCountResponse,
};
use crate::application::services::Actor;
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::{QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::shared::pagination::PaginatedResponse;
use crate::startup::AppState;

/// Caller's notifications, newest first
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<NotificationResponse>>, AppError> {
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .notifications
        .get_user_notifications(actor.user_id, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, NotificationResponse::from)))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = state.notifications.get_unread_count(actor.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_viewed(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<IdsRequest>,
) -> Result<Json<IdsResponse>, AppError> {
    let ids = state.notifications.mark_viewed(actor.user_id, &body.ids).await?;
    Ok(Json(ids.into()))
}

pub async fn remove_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<IdsRequest>,
) -> Result<Json<IdsResponse>, AppError> {
    let ids = state.notifications.remove(actor.user_id, &body.ids).await?;
    Ok(Json(ids.into()))
}

/// Internal endpoint other modules deliver notifications to
pub async fn create_notifications(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateNotificationsRequest>,
) -> Result<(StatusCode, Json<CreatedCountResponse>), AppError> {
    let created = state.notifications.create(body.notifications).await?;
    metrics::record_notifications_stored(created.len());
    Ok((
        StatusCode::CREATED,
        Json(CreatedCountResponse {
            created: created.len(),
        }),
    ))
}
