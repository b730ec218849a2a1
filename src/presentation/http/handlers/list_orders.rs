//! List Orders Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use super::path_id;
use crate::application::dto::request::{
    CopyListOrdersRequest, CreateListOrdersRequest, IdsRequest, ListQuery, UpdateListOrdersRequest,
};
use crate::application::dto::response::{IdsResponse, ListOrdersPriceResponse, ListOrdersResponse};
use crate::application::services::Actor;
use crate::presentation::http::extractors::{QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::shared::pagination::PaginatedResponse;
use crate::startup::AppState;

pub async fn create_list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateListOrdersRequest>,
) -> Result<(StatusCode, Json<ListOrdersResponse>), AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let list = state.list_orders.create(&actor, group_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(list.into())))
}

pub async fn get_list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<ListOrdersResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .list_orders
        .get(&actor, group_id, query.list_orders_query()?, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, ListOrdersResponse::from)))
}

pub async fn modify_list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, list_orders_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UpdateListOrdersRequest>,
) -> Result<Json<ListOrdersResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let list_orders_id = path_id("list orders ID", &list_orders_id)?;
    let list = state
        .list_orders
        .modify(&actor, group_id, list_orders_id, body.into())
        .await?;
    Ok(Json(list.into()))
}

/// Remove lists together with their orders
pub async fn remove_list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<IdsRequest>,
) -> Result<Json<IdsResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let removed = state.list_orders.remove(&actor, group_id, &body.ids).await?;
    Ok(Json(removed.into()))
}

/// Copy a list and its orders
pub async fn copy_list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, list_orders_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<CopyListOrdersRequest>,
) -> Result<(StatusCode, Json<ListOrdersResponse>), AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let list_orders_id = path_id("list orders ID", &list_orders_id)?;
    let list = state
        .list_orders
        .create_from(&actor, group_id, list_orders_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(list.into())))
}

pub async fn get_list_orders_price(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, list_orders_id)): Path<(String, String)>,
) -> Result<Json<ListOrdersPriceResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let list_orders_id = path_id("list orders ID", &list_orders_id)?;
    let price = state
        .list_orders
        .get_price(&actor, group_id, list_orders_id)
        .await?;
    Ok(Json(ListOrdersPriceResponse::new(list_orders_id, price)))
}
