//! Database-backed tests
//!
//! Each test gets a fresh database from `#[sqlx::test]` with the crate's
//! migrations applied.

mod auth_flow_tests;
mod group_flow_tests;
mod list_orders_flow_tests;
mod repository_tests;
