//! Share Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::path_id;
use crate::application::dto::request::{ListQuery, RemoveSharesRequest};
use crate::application::dto::response::{ShareIdsResponse, ShareResponse, SharedListOrdersResponse};
use crate::application::services::Actor;
use crate::presentation::http::extractors::{QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::shared::pagination::PaginatedResponse;
use crate::startup::AppState;

/// Create a public link to a list
pub async fn create_share(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, list_orders_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<ShareResponse>), AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let list_orders_id = path_id("list orders ID", &list_orders_id)?;
    let link = state.shares.create(&actor, group_id, list_orders_id).await?;
    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Resolve a public link; no authentication
pub async fn get_shared(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedListOrdersResponse>, AppError> {
    // A malformed token can't match any share
    let token = Uuid::parse_str(&token).map_err(|_| AppError::NotFound("Share not found".into()))?;
    let shared = state.shares.get_shared(token).await?;
    Ok(Json(shared.into()))
}

/// Live shares created by the caller
pub async fn get_user_shares(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<ShareResponse>>, AppError> {
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state.shares.get_user_shares(actor.user_id, pagination).await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, ShareResponse::from)))
}

pub async fn remove_shares(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<RemoveSharesRequest>,
) -> Result<Json<ShareIdsResponse>, AppError> {
    let ids = state.shares.remove(actor.user_id, &body.ids).await?;
    Ok(Json(ShareIdsResponse { ids }))
}
