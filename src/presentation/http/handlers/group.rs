//! Group Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use super::path_id;
use crate::application::dto::request::{
    AddGroupUsersRequest, CreateGroupRequest, IdsRequest, ListQuery, SetRoleRequest, UpdateGroupRequest,
};
use crate::application::dto::response::{
    GroupMemberResponse, GroupResponse, GroupUserResponse, IdsResponse, RoleResponse,
};
use crate::application::services::Actor;
use crate::presentation::http::extractors::{ImageUpload, QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::shared::pagination::PaginatedResponse;
use crate::startup::AppState;

/// Create a group owned by the caller
pub async fn create_group(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), AppError> {
    let group = state.groups.create(actor.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

/// Groups the caller belongs to
pub async fn get_user_groups(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<GroupResponse>>, AppError> {
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .groups
        .get_user_groups(actor.user_id, query.name_filter()?, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, GroupResponse::from)))
}

/// Groups among `?ids=` the caller belongs to
pub async fn get_groups_data(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<GroupResponse>>, AppError> {
    let ids = query.required_ids()?;
    let groups = state.groups.get_data(actor.user_id, &ids).await?;
    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

pub async fn get_group(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let group = state
        .groups
        .get_data(actor.user_id, &[group_id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Group not found".into()))?;
    Ok(Json(group.into()))
}

/// Caller's role in the group; other modules check membership through this
pub async fn get_user_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
) -> Result<Json<RoleResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let role = state.groups.get_user_role(actor.user_id, group_id).await?;
    Ok(Json(role.into()))
}

pub async fn modify_group(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let group = state.groups.modify(actor.user_id, group_id, body.into()).await?;
    Ok(Json(group.into()))
}

pub async fn remove_group(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    state.groups.remove(actor.user_id, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Members of the group
pub async fn get_group_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<PaginatedResponse<GroupMemberResponse>>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let pagination = query.pagination(state.settings.pagination.max_page_items)?;
    let page = state
        .groups
        .get_users(actor.user_id, group_id, query.name_filter()?, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page, pagination, GroupMemberResponse::from)))
}

pub async fn add_group_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<AddGroupUsersRequest>,
) -> Result<(StatusCode, Json<Vec<GroupUserResponse>>), AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let added = state
        .groups
        .add_users(actor.user_id, group_id, body.into_dtos())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(added.into_iter().map(GroupUserResponse::from).collect()),
    ))
}

pub async fn remove_group_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ValidatedJson(body): ValidatedJson<IdsRequest>,
) -> Result<Json<IdsResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let removed = state
        .groups
        .remove_users(actor.user_id, group_id, &body.ids)
        .await?;
    Ok(Json(removed.into()))
}

pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((group_id, user_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<SetRoleRequest>,
) -> Result<StatusCode, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let user_id = path_id("user ID", &user_id)?;
    state
        .groups
        .set_role(actor.user_id, group_id, user_id, body.admin)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_group_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
    ImageUpload(image): ImageUpload,
) -> Result<Json<GroupResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let group = state.groups.set_image(actor.user_id, group_id, image).await?;
    Ok(Json(group.into()))
}

pub async fn remove_group_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupResponse>, AppError> {
    let group_id = path_id("group ID", &group_id)?;
    let group = state.groups.remove_image(actor.user_id, group_id).await?;
    Ok(Json(group.into()))
}
