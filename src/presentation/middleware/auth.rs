//! Authentication Middleware
//!
//! JWT validation for protected routes and the shared key check for
//! internal module endpoints.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::application::services::{decode_access_token, Actor};
use crate::infrastructure::modules::MODULE_KEY_HEADER;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Validates the bearer token and exposes the caller as an [`Actor`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let user_id = decode_access_token(&state.settings.jwt.secret, token)?;

    // The token travels on so calls to other modules act as the same user
    let actor = Actor::new(user_id, token);
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

/// Rejects internal calls that don't carry the configured module key.
pub async fn internal_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = request
        .headers()
        .get(MODULE_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if key != Some(state.settings.modules.internal_key.as_str()) {
        return Err(AppError::Forbidden("Invalid module key".into()));
    }

    Ok(next.run(request).await)
}
