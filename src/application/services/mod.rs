//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT and refresh token sessions
//! - **UserService**: Profile of the authenticated user
//! - **GroupService**: Groups, members and roles
//! - **ProductService** / **ShopService**: A group's catalogue
//! - **ListOrdersService** / **OrderService**: Shopping lists and their lines
//! - **ShareService**: Public links to lists
//! - **NotificationService**: Pulled user notifications

pub mod auth_service;
pub mod group_service;
pub mod list_orders_service;
pub mod notification_service;
pub mod order_service;
pub mod product_service;
pub mod share_service;
pub mod shop_service;
pub mod user_service;

pub use auth_service::{decode_access_token, AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims};
pub use group_service::{
    CreateGroupDto, GroupError, GroupService, GroupServiceImpl, NewGroupUserDto, UpdateGroupDto,
};
pub use list_orders_service::{
    CopyListOrdersDto, ListOrdersDataDto, ListOrdersError, ListOrdersService, ListOrdersServiceImpl,
    UpdateListOrdersDto,
};
pub use notification_service::{NotificationService, NotificationServiceImpl};
pub use order_service::{OrderDataDto, OrderError, OrderService, OrderServiceImpl, UpdateOrderDto};
pub use product_service::{
    ProductDataDto, ProductError, ProductService, ProductServiceImpl, ShopPriceDto, UpdateProductDto,
};
pub use share_service::{SharedLink, SharedListOrders, ShareError, ShareService, ShareServiceImpl};
pub use shop_service::{ShopDataDto, ShopError, ShopService, ShopServiceImpl, UpdateShopDto};
pub use user_service::{UserError, UserService, UserServiceImpl};

/// The authenticated caller of a request.
///
/// The raw bearer token travels along so calls to other modules act on
/// behalf of the same user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub token: String,
}

impl Actor {
    pub fn new(user_id: i64, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}
