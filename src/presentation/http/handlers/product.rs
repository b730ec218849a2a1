//! Product Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use super::path_id;
use crate::application::dto::request::{
    CreateProductRequest, IdsRequest, ListQuery, ProductIdsQuery, SetShopPricesRequest, UpdateProductRequest,
};
use crate::application::dto::response::{IdsResponse, ProductResponse, ProductShopResponse};
use crate::application::services::Actor;
use crate::presentation::http::extractors::{ImageUpload, QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::shared::pagination::PaginatedResponse;
use crate::startup::AppState;

pub async fn create_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let product = state.products.create(&actor, group_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Products of the group, filtered by name, `?ids=` or `?shop_id=`
pub async fn get_products(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<ProductResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .products
        .get(&actor, group_id, query.product_query()?, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, ProductResponse::from)))
}

pub async fn modify_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, product_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let product_id = path_id("product ID", &product_id)?;
    let product = state
        .products
        .modify(&actor, group_id, product_id, body.into())
        .await?;
    Ok(Json(product.into()))
}

pub async fn remove_products(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<IdsRequest>,
) -> Result<Json<IdsResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let removed = state.products.remove(&actor, group_id, &body.ids).await?;
    Ok(Json(removed.into()))
}

/// Replace the shops selling a product and their prices
pub async fn set_shop_prices(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, product_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<SetShopPricesRequest>,
) -> Result<Json<Vec<ProductShopResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let product_id = path_id("product ID", &product_id)?;
    let prices = state
        .products
        .set_shop_prices(&actor, group_id, product_id, body.into_dtos())
        .await?;
    Ok(Json(prices.into_iter().map(ProductShopResponse::from).collect()))
}

/// Shop prices of one product
pub async fn get_product_shop_prices(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, product_id)): Path<(String, String)>,
) -> Result<Json<Vec<ProductShopResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let product_id = path_id("product ID", &product_id)?;
    let prices = state
        .products
        .get_shop_prices(&actor, group_id, &[product_id])
        .await?;
    Ok(Json(prices.into_iter().map(ProductShopResponse::from).collect()))
}

/// Shop prices of `?product_ids=`
pub async fn get_shop_prices(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    QueryParams(query): QueryParams<ProductIdsQuery>,
) -> Result<Json<Vec<ProductShopResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let prices = state
        .products
        .get_shop_prices(&actor, group_id, &query.ids()?)
        .await?;
    Ok(Json(prices.into_iter().map(ProductShopResponse::from).collect()))
}

pub async fn set_product_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, product_id)): Path<(String, String)>,
    ImageUpload(image): ImageUpload,
) -> Result<Json<ProductResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let product_id = path_id("product ID", &product_id)?;
    let product = state
        .products
        .set_image(&actor, group_id, product_id, image)
        .await?;
    Ok(Json(product.into()))
}

pub async fn remove_product_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, product_id)): Path<(String, String)>,
) -> Result<Json<ProductResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let product_id = path_id("product ID", &product_id)?;
    let product = state
        .products
        .remove_image(&actor, group_id, product_id)
        .await?;
    Ok(Json(product.into()))
}
