//! User Handlers

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{ChangePasswordRequest, ListQuery, UpdateMeRequest};
use crate::application::dto::response::UserResponse;
use crate::application::services::Actor;
use crate::presentation::http::extractors::{ImageUpload, QueryParams, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

const MAX_USERS_PER_REQUEST: usize = 50;

/// Get current authenticated user
pub async fn get_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get_me(actor.user_id).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

/// Public profiles of `?ids=`
pub async fn get_users(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let ids = query.required_ids()?;
    if ids.len() > MAX_USERS_PER_REQUEST {
        return Err(AppError::invalid("ids", "Between 1 and 50 users can be requested"));
    }

    let users = state.users.get_users(&ids).await?;
    Ok(Json(
        users
            .into_iter()
            .map(|u| UserResponse::from_user(u, false))
            .collect(),
    ))
}

/// Update current user profile
pub async fn modify_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.modify_me(actor.user_id, &body.name).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    state
        .users
        .change_password(actor.user_id, &body.old_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ImageUpload(image): ImageUpload,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.set_image(actor.user_id, image).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

pub async fn remove_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.remove_image(actor.user_id).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

/// Delete the current account
pub async fn remove_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<StatusCode, AppError> {
    state.users.remove_me(actor.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
