//! # Domain Entities
//!
//! Core business objects of the shopping API. All entities map directly to
//! their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **User**: account with credentials and profile
//! - **Group**: a set of users sharing products, shops and lists
//! - **Product** / **Shop**: what a group buys and where, with per-shop prices
//! - **ListOrders** / **Order**: shopping lists and their lines
//!
//! ## Supporting Entities
//!
//! - **Session**: refresh token sessions
//! - **Notification**: pulled user notifications
//! - **ShareListOrders**: public read-only links to a list
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer.

mod group;
mod list_orders;
mod notification;
mod order;
mod product;
mod session;
mod share;
mod shop;
mod user;

pub use group::{Group, GroupMember, GroupRepository, GroupType, GroupUser, MAX_GROUP_USERS};
pub use list_orders::{ListOrders, ListOrdersPrice, ListOrdersQuery, ListOrdersRepository};
pub use notification::{NewNotification, Notification, NotificationRepository, NotificationType};
pub use order::{Order, OrderDetail, OrderFilterSection, OrderQuery, OrderRepository, MAX_ORDER_AMOUNT};
pub use product::{Product, ProductQuery, ProductRepository, ProductShop};
pub use session::{Session, SessionRepository};
pub use share::{ShareListOrders, ShareRepository};
pub use shop::{Shop, ShopQuery, ShopRepository};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use group::MockGroupRepository;
#[cfg(test)]
pub use list_orders::MockListOrdersRepository;
#[cfg(test)]
pub use notification::MockNotificationRepository;
#[cfg(test)]
pub use order::MockOrderRepository;
#[cfg(test)]
pub use product::MockProductRepository;
#[cfg(test)]
pub use session::MockSessionRepository;
#[cfg(test)]
pub use share::MockShareRepository;
#[cfg(test)]
pub use shop::MockShopRepository;
#[cfg(test)]
pub use user::MockUserRepository;
