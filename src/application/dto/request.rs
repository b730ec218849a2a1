//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::application::services::{
    CopyListOrdersDto, CreateGroupDto, ListOrdersDataDto, NewGroupUserDto, OrderDataDto, ProductDataDto,
    ShopDataDto, ShopPriceDto, UpdateGroupDto, UpdateListOrdersDto, UpdateOrderDto, UpdateProductDto,
    UpdateShopDto,
};
use crate::domain::{GroupType, ListOrdersQuery, NewNotification, OrderFilterSection, OrderQuery, ProductQuery, ShopQuery, Unit};
use crate::shared::error::AppError;
use crate::shared::pagination::{FilterType, NameFilter, Pagination};
use crate::shared::snowflake::{parse_id, serde_id, serde_ids, serde_opt_id};
use crate::shared::validation::{parse_id_list, validate_name, validate_name_length, validate_unique_ids};

// ---------------------------------------------------------------------------
// Auth & users
// ---------------------------------------------------------------------------

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_name_length"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 64, message = "Password must be 8-64 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh / logout request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(custom(function = "validate_name_length"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,

    #[validate(length(min = 8, max = 64, message = "Password must be 8-64 characters"))]
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub group_type: GroupType,
}

impl From<CreateGroupRequest> for CreateGroupDto {
    fn from(r: CreateGroupRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            group_type: r.group_type,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl From<UpdateGroupRequest> for UpdateGroupDto {
    fn from(r: UpdateGroupRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct GroupUserItem {
    #[serde(with = "serde_id")]
    pub user_id: i64,

    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_group_users"))]
pub struct AddGroupUsersRequest {
    #[validate(length(min = 1, max = 50, message = "Between 1 and 50 users can be added at once"), nested)]
    pub users: Vec<GroupUserItem>,
}

fn validate_group_users(request: &AddGroupUsersRequest) -> Result<(), validator::ValidationError> {
    let ids: Vec<i64> = request.users.iter().map(|u| u.user_id).collect();
    validate_unique_ids(&ids)
}

impl AddGroupUsersRequest {
    pub fn into_dtos(self) -> Vec<NewGroupUserDto> {
        self.users
            .into_iter()
            .map(|u| NewGroupUserDto {
                user_id: u.user_id,
                admin: u.admin,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetRoleRequest {
    pub admin: bool,
}

/// Body carrying a list of snowflake IDs (removals, marking as viewed).
#[derive(Debug, Deserialize, Validate)]
pub struct IdsRequest {
    #[serde(with = "serde_ids")]
    #[validate(
        length(min = 1, max = 100, message = "Between 1 and 100 IDs are allowed"),
        custom(function = "validate_unique_ids")
    )]
    pub ids: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Products & shops
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl From<CreateProductRequest> for ProductDataDto {
    fn from(r: CreateProductRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl From<UpdateProductRequest> for UpdateProductDto {
    fn from(r: UpdateProductRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ShopPriceItem {
    #[serde(with = "serde_id")]
    pub shop_id: i64,

    #[validate(range(min = 0.0, max = 1_000_000.0, message = "Price must be between 0 and 1000000"))]
    pub price: f64,

    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_shop_prices"))]
pub struct SetShopPricesRequest {
    #[validate(length(max = 100, message = "At most 100 shops are allowed"), nested)]
    pub shops: Vec<ShopPriceItem>,
}

fn validate_shop_prices(request: &SetShopPricesRequest) -> Result<(), validator::ValidationError> {
    let ids: Vec<i64> = request.shops.iter().map(|s| s.shop_id).collect();
    validate_unique_ids(&ids)
}

impl SetShopPricesRequest {
    pub fn into_dtos(self) -> Vec<ShopPriceDto> {
        self.shops
            .into_iter()
            .map(|s| ShopPriceDto {
                shop_id: s.shop_id,
                price: s.price,
                unit: s.unit,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateShopRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl From<CreateShopRequest> for ShopDataDto {
    fn from(r: CreateShopRequest) -> Self {
        Self {
            name: r.name,
            address: r.address,
            description: r.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateShopRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl From<UpdateShopRequest> for UpdateShopDto {
    fn from(r: UpdateShopRequest) -> Self {
        Self {
            name: r.name,
            address: r.address,
            description: r.description,
        }
    }
}

// ---------------------------------------------------------------------------
// Lists of orders & orders
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateListOrdersRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub date_to_buy: Option<NaiveDate>,
}

impl From<CreateListOrdersRequest> for ListOrdersDataDto {
    fn from(r: CreateListOrdersRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            date_to_buy: r.date_to_buy,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListOrdersRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub date_to_buy: Option<NaiveDate>,
}

impl From<UpdateListOrdersRequest> for UpdateListOrdersDto {
    fn from(r: UpdateListOrdersRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            date_to_buy: r.date_to_buy,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CopyListOrdersRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub date_to_buy: Option<NaiveDate>,
}

impl From<CopyListOrdersRequest> for CopyListOrdersDto {
    fn from(r: CopyListOrdersRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            date_to_buy: r.date_to_buy,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    #[serde(with = "serde_id")]
    pub product_id: i64,

    #[serde(with = "serde_opt_id", default)]
    pub shop_id: Option<i64>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(range(
        exclusive_min = 0.0,
        max = 1_000_000.0,
        message = "Amount must be greater than 0 and at most 1000000"
    ))]
    pub amount: f64,

    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrdersRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 orders are allowed"), nested)]
    pub orders: Vec<OrderItem>,
}

impl CreateOrdersRequest {
    pub fn into_dtos(self) -> Vec<OrderDataDto> {
        self.orders
            .into_iter()
            .map(|o| OrderDataDto {
                product_id: o.product_id,
                shop_id: o.shop_id,
                description: o.description,
                amount: o.amount,
                unit: o.unit,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    #[serde(with = "serde_opt_id", default)]
    pub product_id: Option<i64>,

    #[serde(with = "serde_opt_id", default)]
    pub shop_id: Option<i64>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(range(
        exclusive_min = 0.0,
        max = 1_000_000.0,
        message = "Amount must be greater than 0 and at most 1000000"
    ))]
    pub amount: Option<f64>,

    pub unit: Option<Unit>,
}

impl From<UpdateOrderRequest> for UpdateOrderDto {
    fn from(r: UpdateOrderRequest) -> Self {
        Self {
            product_id: r.product_id,
            shop_id: r.shop_id,
            description: r.description,
            amount: r.amount,
            unit: r.unit,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetBoughtRequest {
    pub bought: bool,
}

// ---------------------------------------------------------------------------
// Shares & notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveSharesRequest {
    #[validate(length(min = 1, max = 50, message = "Between 1 and 50 shares can be removed at once"))]
    pub ids: Vec<Uuid>,
}

/// Body of the internal notification endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationsRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 notifications are allowed"))]
    pub notifications: Vec<NewNotification>,
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Query parameters shared by listing endpoints.
///
/// IDs are comma separated (`?ids=1,2,3`).
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_items: Option<u32>,
    pub filter_text: Option<String>,
    pub filter_type: Option<FilterType>,
    pub filter_section: Option<OrderFilterSection>,
    pub ids: Option<String>,
    pub shop_id: Option<String>,
    pub product_id: Option<String>,
    pub list_orders_id: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self, max_page_items: u32) -> Result<Pagination, AppError> {
        Pagination::new(self.page, self.page_items, max_page_items)
    }

    pub fn name_filter(&self) -> Result<Option<NameFilter>, AppError> {
        NameFilter::from_query(self.filter_text.clone(), self.filter_type)
    }

    /// `ids` as a list; `None` when absent.
    pub fn ids(&self) -> Result<Option<Vec<i64>>, AppError> {
        self.ids
            .as_deref()
            .map(|raw| {
                let ids = parse_id_list("ids", raw)?;
                if ids.is_empty() || ids.len() > 100 {
                    return Err(AppError::invalid("ids", "Between 1 and 100 IDs are allowed"));
                }
                Ok(ids)
            })
            .transpose()
    }

    /// `ids` that must be present.
    pub fn required_ids(&self) -> Result<Vec<i64>, AppError> {
        self.ids()?
            .ok_or_else(|| AppError::invalid("ids", "IDs are required"))
    }

    fn optional_id(field: &str, raw: Option<&str>) -> Result<Option<i64>, AppError> {
        raw.map(|s| parse_id(s).ok_or_else(|| AppError::invalid(field, "Invalid ID")))
            .transpose()
    }

    pub fn product_query(&self) -> Result<ProductQuery, AppError> {
        Ok(ProductQuery {
            ids: self.ids()?,
            shop_id: Self::optional_id("shop_id", self.shop_id.as_deref())?,
            filter: self.name_filter()?,
        })
    }

    pub fn shop_query(&self) -> Result<ShopQuery, AppError> {
        Ok(ShopQuery {
            ids: self.ids()?,
            product_id: Self::optional_id("product_id", self.product_id.as_deref())?,
            filter: self.name_filter()?,
        })
    }

    pub fn list_orders_query(&self) -> Result<ListOrdersQuery, AppError> {
        Ok(ListOrdersQuery {
            ids: self.ids()?,
            filter: self.name_filter()?,
        })
    }

    pub fn order_query(&self, list_orders_id: Option<i64>) -> Result<OrderQuery, AppError> {
        let list_orders_id = match list_orders_id {
            Some(id) => Some(id),
            None => Self::optional_id("list_orders_id", self.list_orders_id.as_deref())?,
        };
        Ok(OrderQuery {
            ids: self.ids()?,
            list_orders_id,
            filter: self.name_filter()?,
            filter_section: self.filter_section.unwrap_or_default(),
        })
    }
}

/// `?product_ids=` of the shop prices endpoint.
#[derive(Debug, Deserialize)]
pub struct ProductIdsQuery {
    pub product_ids: String,
}

impl ProductIdsQuery {
    pub fn ids(&self) -> Result<Vec<i64>, AppError> {
        let ids = parse_id_list("product_ids", &self.product_ids)?;
        if ids.is_empty() || ids.len() > 100 {
            return Err(AppError::invalid("product_ids", "Between 1 and 100 IDs are allowed"));
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::FieldError;
    use crate::shared::validation::validate_request;
    use serde_json::json;

    fn field_names(error: AppError) -> Vec<String> {
        match error {
            AppError::Validation(errors) => errors.into_iter().map(|FieldError { field, .. }| field).collect(),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_register_validation() {
        let request: RegisterRequest =
            serde_json::from_value(json!({"name": "A", "email": "not-an-email", "password": "short"})).unwrap();
        assert_eq!(
            field_names(validate_request(&request).unwrap_err()),
            vec!["email", "name", "password"]
        );
    }

    #[test]
    fn test_group_name_charset() {
        let request: CreateGroupRequest = serde_json::from_value(json!({"name": "Bad;name"})).unwrap();
        assert!(validate_request(&request).is_err());

        let request: CreateGroupRequest = serde_json::from_value(json!({"name": "Flat 3.B"})).unwrap();
        assert!(validate_request(&request).is_ok());
        assert_eq!(request.group_type, GroupType::Group);
    }

    #[test]
    fn test_name_length_ignores_surrounding_spaces() {
        let request: CreateGroupRequest = serde_json::from_value(json!({"name": "a "})).unwrap();
        assert_eq!(field_names(validate_request(&request).unwrap_err()), vec!["name"]);

        let request: UpdateShopRequest = serde_json::from_value(json!({"name": format!(" {} ", "x".repeat(50))})).unwrap();
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_list_items_serialize_for_error_params() {
        let item: ShopPriceItem = serde_json::from_value(json!({"shop_id": "3", "price": 2.5})).unwrap();
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"shop_id": "3", "price": 2.5, "unit": "units"})
        );
    }

    #[test]
    fn test_order_amount_bounds() {
        let request: CreateOrdersRequest = serde_json::from_value(json!({
            "orders": [
                {"product_id": "1", "amount": 2, "unit": "kg"},
                {"product_id": "2", "amount": 0},
                {"product_id": "3", "amount": 1000001}
            ]
        }))
        .unwrap();
        assert_eq!(
            field_names(validate_request(&request).unwrap_err()),
            vec!["orders[1].amount", "orders[2].amount"]
        );
    }

    #[test]
    fn test_unknown_unit_is_rejected_when_parsing() {
        let result = serde_json::from_value::<OrderItem>(json!({"product_id": "1", "amount": 1, "unit": "bag"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_group_users_are_rejected() {
        let request: AddGroupUsersRequest = serde_json::from_value(json!({
            "users": [{"user_id": "2"}, {"user_id": "2", "admin": true}]
        }))
        .unwrap();
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_ids_request_limits() {
        let request: IdsRequest = serde_json::from_value(json!({"ids": []})).unwrap();
        assert!(validate_request(&request).is_err());

        let request: IdsRequest = serde_json::from_value(json!({"ids": ["1", "2"]})).unwrap();
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_list_query_builds_product_query() {
        let query = ListQuery {
            ids: Some("1,2".into()),
            shop_id: Some("20".into()),
            filter_text: Some("mil".into()),
            filter_type: Some(FilterType::StartsWith),
            ..Default::default()
        };
        let product_query = query.product_query().unwrap();
        assert_eq!(product_query.ids, Some(vec![1, 2]));
        assert_eq!(product_query.shop_id, Some(20));
        assert_eq!(product_query.filter.unwrap().like_pattern(), "mil%");
    }

    #[test]
    fn test_list_query_rejects_bad_ids() {
        let query = ListQuery {
            shop_id: Some("abc".into()),
            ..Default::default()
        };
        assert!(query.product_query().is_err());
        assert!(ListQuery::default().required_ids().is_err());
    }

    #[test]
    fn test_order_query_prefers_path_list() {
        let query = ListQuery {
            list_orders_id: Some("9".into()),
            ..Default::default()
        };
        assert_eq!(query.order_query(Some(5)).unwrap().list_orders_id, Some(5));
        assert_eq!(query.order_query(None).unwrap().list_orders_id, Some(9));
    }
}
