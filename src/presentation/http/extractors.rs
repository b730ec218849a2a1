//! Custom Extractors
//!
//! Axum extractors that report rejections with the API's error body.

use axum::{
    extract::{
        multipart::MultipartError, rejection::QueryRejection, FromRequest, FromRequestParts, Multipart, Query,
        Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::shared::error::AppError;
use crate::shared::validation::validate_request;

/// JSON body that has passed its `validator` rules.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            match rejection.status() {
                StatusCode::UNSUPPORTED_MEDIA_TYPE => AppError::UnsupportedMediaType(rejection.body_text()),
                StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
                _ => deserialize_error(rejection.body_text()),
            }
        })?;
        validate_request(&value)?;
        Ok(Self(value))
    }
}

/// Query string parsed with `serde_urlencoded`.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| deserialize_error(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Unknown enum values (units, filter types) are field errors; anything
/// else that fails to deserialize is a bad request.
fn deserialize_error(text: String) -> AppError {
    match unknown_variant(&text) {
        Some((field, value)) => AppError::invalid(&field, &format!("Unknown value {}", value)),
        None => AppError::BadRequest(text),
    }
}

/// Field path and offending value of a serde "unknown variant" message,
/// e.g. `...target type: orders[0].unit: unknown variant `parsec`, expected ...`.
fn unknown_variant(text: &str) -> Option<(String, String)> {
    let (head, tail) = text.split_once("unknown variant ")?;
    let path = head.trim_end_matches(": ").rsplit(": ").next().unwrap_or_default();
    let field = if path.is_empty() || path.contains(' ') { "body" } else { path };
    let value = tail.split(',').next().unwrap_or_default().trim();
    Some((field.to_string(), value.to_string()))
}

/// Multipart form field the images are uploaded in.
pub const IMAGE_FIELD: &str = "image";

/// Raw bytes of the `image` field of a multipart upload.
///
/// Format and size are checked by the image store.
#[derive(Debug)]
pub struct ImageUpload(pub Vec<u8>);

impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::UnsupportedMediaType(rejection.body_text()))?;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() == Some(IMAGE_FIELD) {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                return Ok(Self(bytes.to_vec()));
            }
        }

        Err(AppError::invalid(IMAGE_FIELD, "Image file is required"))
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}
