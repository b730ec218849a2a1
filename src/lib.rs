//! # Shopping API Library
//!
//! Backend for shared shopping lists:
//! - Users, JWT authentication and refresh token sessions
//! - Groups with admins and members
//! - A per-group catalogue of products and shops with prices
//! - Shopping lists, their orders and public share links
//! - Pulled notifications fed by the other modules
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities, repository traits and module ports
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: PostgreSQL, inter-module HTTP, image storage, metrics
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! shopping_api/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and ports
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, module clients, storage, metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Common utilities (errors, pagination, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
