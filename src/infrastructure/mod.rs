//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Inter-module HTTP clients
//! - Local image storage
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod modules;
pub mod repositories;
pub mod storage;
