//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake IDs are rendered as
//! strings for JavaScript clients.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{AuthTokens, SharedLink, SharedListOrders};
use crate::domain::{
    Group, GroupMember, GroupRole, GroupType, GroupUser, ListOrders, ListOrdersPrice, Notification,
    NotificationType, Order, OrderDetail, Product, ProductShop, Shop, Unit, User,
};

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration response (includes user and tokens)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: if include_email { Some(user.email) } else { None },
            image: user.image,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub group_type: GroupType,
    pub created_at: DateTime<Utc>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name,
            description: group.description,
            image: group.image,
            group_type: group.group_type,
            created_at: group.created_at,
        }
    }
}

/// A member as listed by `GET /groups/{id}/users`
#[derive(Debug, Serialize)]
pub struct GroupMemberResponse {
    pub user_id: String,
    pub name: String,
    pub image: Option<String>,
    pub admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<GroupMember> for GroupMemberResponse {
    fn from(member: GroupMember) -> Self {
        Self {
            user_id: member.user_id.to_string(),
            name: member.name,
            image: member.image,
            admin: member.admin,
            joined_at: member.joined_at,
        }
    }
}

/// A membership created by `POST /groups/{id}/users`
#[derive(Debug, Serialize)]
pub struct GroupUserResponse {
    pub group_id: String,
    pub user_id: String,
    pub admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<GroupUser> for GroupUserResponse {
    fn from(membership: GroupUser) -> Self {
        Self {
            group_id: membership.group_id.to_string(),
            user_id: membership.user_id.to_string(),
            admin: membership.admin,
            joined_at: membership.joined_at,
        }
    }
}

/// Body of `GET /groups/{id}/role`, read back by the group gateway.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub admin: bool,
}

impl From<GroupRole> for RoleResponse {
    fn from(role: GroupRole) -> Self {
        Self { admin: role.is_admin() }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            group_id: product.group_id.to_string(),
            name: product.name,
            description: product.description,
            image: product.image,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductShopResponse {
    pub product_id: String,
    pub shop_id: String,
    pub price: f64,
    pub unit: Unit,
}

impl From<ProductShop> for ProductShopResponse {
    fn from(price: ProductShop) -> Self {
        Self {
            product_id: price.product_id.to_string(),
            shop_id: price.shop_id.to_string(),
            price: price.price,
            unit: price.unit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShopResponse {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Shop> for ShopResponse {
    fn from(shop: Shop) -> Self {
        Self {
            id: shop.id.to_string(),
            group_id: shop.group_id.to_string(),
            name: shop.name,
            address: shop.address,
            description: shop.description,
            image: shop.image,
            created_at: shop.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub id: String,
    pub group_id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub date_to_buy: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<ListOrders> for ListOrdersResponse {
    fn from(list: ListOrders) -> Self {
        Self {
            id: list.id.to_string(),
            group_id: list.group_id.to_string(),
            user_id: list.user_id.map(|id| id.to_string()),
            name: list.name,
            description: list.description,
            date_to_buy: list.date_to_buy,
            created_at: list.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListOrdersPriceResponse {
    pub list_orders_id: String,
    pub total: f64,
    pub bought: f64,
}

impl ListOrdersPriceResponse {
    pub fn new(list_orders_id: i64, price: ListOrdersPrice) -> Self {
        Self {
            list_orders_id: list_orders_id.to_string(),
            total: price.total,
            bought: price.bought,
        }
    }
}

/// Order response
///
/// Product and shop names are present when the order was loaded for display.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub group_id: String,
    pub list_orders_id: String,
    pub user_id: Option<String>,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub shop_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    pub description: Option<String>,
    pub amount: f64,
    pub unit: Unit,
    pub bought: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            group_id: order.group_id.to_string(),
            list_orders_id: order.list_orders_id.to_string(),
            user_id: order.user_id.map(|id| id.to_string()),
            product_id: order.product_id.to_string(),
            product_name: None,
            shop_id: order.shop_id.map(|id| id.to_string()),
            shop_name: None,
            description: order.description,
            amount: order.amount,
            unit: order.unit,
            bought: order.bought,
            created_at: order.created_at,
        }
    }
}

impl From<OrderDetail> for OrderResponse {
    fn from(detail: OrderDetail) -> Self {
        let mut response = OrderResponse::from(detail.order);
        response.product_name = Some(detail.product_name);
        response.shop_name = detail.shop_name;
        response
    }
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub id: Uuid,
    pub list_orders_id: String,
    pub group_id: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SharedLink> for ShareResponse {
    fn from(link: SharedLink) -> Self {
        Self {
            id: link.share.id,
            list_orders_id: link.share.list_orders_id.to_string(),
            group_id: link.share.group_id.to_string(),
            url: link.url,
            expires_at: link.share.expires_at,
            created_at: link.share.created_at,
        }
    }
}

/// What `GET /shares/{token}` returns to anonymous visitors
#[derive(Debug, Serialize)]
pub struct SharedListOrdersResponse {
    pub list_orders: ListOrdersResponse,
    pub orders: Vec<OrderResponse>,
    pub expires_at: DateTime<Utc>,
}

impl From<SharedListOrders> for SharedListOrdersResponse {
    fn from(shared: SharedListOrders) -> Self {
        Self {
            list_orders: shared.list.into(),
            orders: shared.orders.into_iter().map(OrderResponse::from).collect(),
            expires_at: shared.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub notification_type: NotificationType,
    pub data: serde_json::Value,
    pub viewed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id.to_string(),
            notification_type: n.notification_type,
            data: n.data,
            viewed: n.viewed,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// IDs affected by a bulk operation
#[derive(Debug, Serialize)]
pub struct IdsResponse {
    pub ids: Vec<String>,
}

impl From<Vec<i64>> for IdsResponse {
    fn from(ids: Vec<i64>) -> Self {
        Self {
            ids: ids.into_iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShareIdsResponse {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CreatedCountResponse {
    pub created: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn order() -> Order {
        Order {
            id: 1,
            group_id: 2,
            list_orders_id: 3,
            user_id: Some(4),
            product_id: 5,
            shop_id: None,
            description: None,
            amount: 1.5,
            unit: Unit::Kg,
            bought: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ids_are_strings() {
        let value = serde_json::to_value(OrderResponse::from(order())).unwrap();
        assert_eq!(value["id"], json!("1"));
        assert_eq!(value["product_id"], json!("5"));
        assert_eq!(value["shop_id"], json!(null));
        assert_eq!(value["unit"], json!("kg"));
        assert!(value.get("product_name").is_none());
    }

    #[test]
    fn test_order_detail_carries_names() {
        let detail = OrderDetail {
            order: order(),
            product_name: "Milk".into(),
            shop_name: Some("Corner".into()),
        };
        let response = OrderResponse::from(detail);
        assert_eq!(response.product_name.as_deref(), Some("Milk"));
        assert_eq!(response.shop_name.as_deref(), Some("Corner"));
    }

    #[test]
    fn test_public_user_hides_email() {
        let user = User {
            id: 9,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "hash".into(),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(UserResponse::from_user(user, false)).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_register_response_flattens_tokens() {
        let user = User {
            id: 9,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "hash".into(),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = RegisterResponse {
            user: UserResponse::from_user(user, true),
            tokens: TokenResponse {
                access_token: "a".into(),
                refresh_token: "r".into(),
                expires_in: 900,
                token_type: "Bearer".into(),
            },
        };
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["access_token"], json!("a"));
        assert_eq!(value["user"]["email"], json!("ana@example.com"));
    }
}
