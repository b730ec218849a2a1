//! # Domain Layer
//!
//! The domain layer contains the core business rules of the shopping API.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, Group, Product, Order, etc.)
//! - **value_objects**: Immutable value types (Unit, GroupRole, ImageKind)
//! - **services**: Group rules and ports to other modules
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
