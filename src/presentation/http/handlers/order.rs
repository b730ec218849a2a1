//! Order Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use super::path_id;
use crate::application::dto::request::{
    CreateOrdersRequest, IdsRequest, ListQuery, SetBoughtRequest, UpdateOrderRequest,
};
use crate::application::dto::response::{IdsResponse, OrderResponse};
use crate::application::services::Actor;
use crate::presentation::http::extractors::{QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::shared::pagination::PaginatedResponse;
use crate::startup::AppState;

/// Add orders to a list
pub async fn create_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, list_orders_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<CreateOrdersRequest>,
) -> Result<(StatusCode, Json<Vec<OrderResponse>>), AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let list_orders_id = path_id("list orders ID", &list_orders_id)?;
    let orders = state
        .orders
        .create(&actor, group_id, list_orders_id, body.into_dtos())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(orders.into_iter().map(OrderResponse::from).collect()),
    ))
}

/// Orders of one list
pub async fn get_list_orders_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, list_orders_id)): Path<(String, String)>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<OrderResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let list_orders_id = path_id("list orders ID", &list_orders_id)?;
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .orders
        .get(&actor, group_id, query.order_query(Some(list_orders_id))?, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, OrderResponse::from)))
}

/// Orders of the group, optionally narrowed by `?list_orders_id=` or `?ids=`
pub async fn get_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<OrderResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .orders
        .get(&actor, group_id, query.order_query(None)?, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, OrderResponse::from)))
}

pub async fn modify_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, order_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let order_id = path_id("order ID", &order_id)?;
    let order = state
        .orders
        .modify(&actor, group_id, order_id, body.into())
        .await?;
    Ok(Json(order.into()))
}

pub async fn remove_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<IdsRequest>,
) -> Result<Json<IdsResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let removed = state.orders.remove(&actor, group_id, &body.ids).await?;
    Ok(Json(removed.into()))
}

pub async fn set_order_bought(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, order_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<SetBoughtRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let order_id = path_id("order ID", &order_id)?;
    let order = state
        .orders
        .set_bought(&actor, group_id, order_id, body.bought)
        .await?;
    Ok(Json(order.into()))
}
