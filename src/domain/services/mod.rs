//! # Domain Services
//!
//! Business rules that don't belong to a single entity, and the ports
//! services use to reach other modules.
//!
//! - **GroupPolicy**: membership and admin invariants
//! - **GroupGateway** / **NotificationGateway**: inter-module access
//! - **ImageStore**: uploaded image persistence

mod gateways;
mod group_policy;

pub use gateways::*;
pub use group_policy::*;
