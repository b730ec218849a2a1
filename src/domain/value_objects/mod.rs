//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! - **Unit**: measurement unit of an order or a product price
//! - **ImageKind**: which entity an uploaded image belongs to
//! - **GroupRole**: a member's role inside a group

mod group_role;
mod image_kind;
mod unit;

pub use group_role::*;
pub use image_kind::*;
pub use unit::*;
