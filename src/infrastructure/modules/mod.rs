//! Inter-module communication
//!
//! Every module is served by this binary, but they only reach each other
//! through their public HTTP APIs.

pub mod client;
pub mod group_gateway;
pub mod notification_gateway;

pub use client::{ModuleClient, ModuleError, MODULE_KEY_HEADER};
pub use group_gateway::HttpGroupGateway;
pub use notification_gateway::{HttpNotificationGateway, INTERNAL_NOTIFICATIONS_PATH};
