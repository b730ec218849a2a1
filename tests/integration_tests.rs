//! Integration Tests Entry Point
//!
//! Tests are organized by module:
//! - `api/` - REST API endpoint tests
//! - `db/` - Tests against a migrated PostgreSQL database (`DATABASE_URL`)
//! - `common/` - Shared test utilities

mod api;
mod common;
mod db;
