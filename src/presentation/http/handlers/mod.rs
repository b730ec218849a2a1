//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod group;
pub mod health;
pub mod list_orders;
pub mod notification;
pub mod order;
pub mod product;
pub mod share;
pub mod shop;
pub mod user;

use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;

/// Parse a snowflake ID taken from the URL path.
pub(crate) fn path_id(name: &str, raw: &str) -> Result<i64, AppError> {
    parse_id(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid {}", name)))
}
