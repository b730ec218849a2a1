//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type and translates storage errors to `AppError`.
//!
//! ## Available Repositories
//!
//! - **UserRepository** / **SessionRepository** - accounts and refresh tokens
//! - **GroupRepository** - groups and their members
//! - **ProductRepository** / **ShopRepository** - a group's catalogue and prices
//! - **ListOrdersRepository** / **OrderRepository** - shopping lists
//! - **ShareRepository** - public list links
//! - **NotificationRepository** - pulled notifications
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgGroupRepository, PgUserRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let group_repo = PgGroupRepository::new(pool);
//! }
//! ```

pub mod group_repository;
pub mod list_orders_repository;
pub mod notification_repository;
pub mod order_repository;
pub mod product_repository;
pub mod session_repository;
pub mod share_repository;
pub mod shop_repository;
pub mod user_repository;

pub use group_repository::PgGroupRepository;
pub use list_orders_repository::PgListOrdersRepository;
pub use notification_repository::PgNotificationRepository;
pub use order_repository::PgOrderRepository;
pub use product_repository::PgProductRepository;
pub use session_repository::PgSessionRepository;
pub use share_repository::PgShareRepository;
pub use shop_repository::PgShopRepository;
pub use user_repository::PgUserRepository;
