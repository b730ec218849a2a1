//! Shop Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use super::path_id;
use crate::application::dto::request::{CreateShopRequest, IdsRequest, ListQuery, UpdateShopRequest};
use crate::application::dto::response::{IdsResponse, ShopResponse};
use crate::application::services::Actor;
use crate::presentation::http::extractors::{ImageUpload, QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::shared::pagination::PaginatedResponse;
use crate::startup::AppState;

pub async fn create_shop(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateShopRequest>,
) -> Result<(StatusCode, Json<ShopResponse>), AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let shop = state.shops.create(&actor, group_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(shop.into())))
}

/// Shops of the group, filtered by name, `?ids=` or `?product_id=`
pub async fn get_shops(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<ShopResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .shops
        .get(&actor, group_id, query.shop_query()?, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, ShopResponse::from)))
}

pub async fn modify_shop(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, shop_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UpdateShopRequest>,
) -> Result<Json<ShopResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let shop_id = path_id("shop ID", &shop_id)?;
    let shop = state.shops.modify(&actor, group_id, shop_id, body.into()).await?;
    Ok(Json(shop.into()))
}

pub async fn remove_shops(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<IdsRequest>,
) -> Result<Json<IdsResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let removed = state.shops.remove(&actor, group_id, &body.ids).await?;
    Ok(Json(removed.into()))
}

pub async fn set_shop_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, shop_id)): Path<(String, String)>,
    ImageUpload(image): ImageUpload,
) -> Result<Json<ShopResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let shop_id = path_id("shop ID", &shop_id)?;
    let shop = state.shops.set_image(&actor, group_id, shop_id, image).await?;
    Ok(Json(shop.into()))
}

pub async fn remove_shop_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, shop_id)): Path<(String, String)>,
) -> Result<Json<ShopResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let shop_id = path_id("shop ID", &shop_id)?;
    let shop = state.shops.remove_image(&actor, group_id, shop_id).await?;
    Ok(Json(shop.into()))
}
