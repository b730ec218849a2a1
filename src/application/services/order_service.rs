//! Order Service
//!
//! Lines of the shopping lists. Products and shops of an order must belong
//! to the order's group, and the shop must sell the product.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::Actor;
use crate::domain::services::{require_member, GroupGateway};
use crate::domain::{
    ListOrdersRepository, Order, OrderDetail, OrderQuery, OrderRepository, ProductRepository, ShopRepository, Unit,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};
use crate::shared::snowflake::SnowflakeGenerator;

/// Order service trait
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Add orders to a list
    async fn create(
        &self,
        actor: &Actor,
        group_id: i64,
        list_orders_id: i64,
        orders: Vec<OrderDataDto>,
    ) -> Result<Vec<Order>, OrderError>;

    async fn get(
        &self,
        actor: &Actor,
        group_id: i64,
        query: OrderQuery,
        pagination: Pagination,
    ) -> Result<Page<OrderDetail>, OrderError>;

    async fn modify(&self, actor: &Actor, group_id: i64, order_id: i64, update: UpdateOrderDto) -> Result<Order, OrderError>;

    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, OrderError>;

    async fn set_bought(&self, actor: &Actor, group_id: i64, order_id: i64, bought: bool) -> Result<Order, OrderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDataDto {
    pub product_id: i64,
    pub shop_id: Option<i64>,
    pub description: Option<String>,
    pub amount: f64,
    pub unit: Unit,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrderDto {
    pub product_id: Option<i64>,
    pub shop_id: Option<i64>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<Unit>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,

    #[error("List of orders not found")]
    ListNotFound,

    #[error("Products not found: {0:?}")]
    ProductsNotFound(Vec<i64>),

    #[error("Shops not found: {0:?}")]
    ShopsNotFound(Vec<i64>),

    #[error("Shop {shop_id} does not sell product {product_id}")]
    ProductNotInShop { product_id: i64, shop_id: i64 },

    #[error(transparent)]
    Other(#[from] AppError),
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound
            | OrderError::ListNotFound
            | OrderError::ProductsNotFound(_)
            | OrderError::ShopsNotFound(_) => AppError::NotFound(e.to_string()),
            OrderError::ProductNotInShop { .. } => AppError::BadRequest(e.to_string()),
            OrderError::Other(e) => e,
        }
    }
}

pub struct OrderServiceImpl<O, L, P, S>
where
    O: OrderRepository,
    L: ListOrdersRepository,
    P: ProductRepository,
    S: ShopRepository,
{
    order_repo: Arc<O>,
    list_repo: Arc<L>,
    product_repo: Arc<P>,
    shop_repo: Arc<S>,
    groups: Arc<dyn GroupGateway>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<O, L, P, S> OrderServiceImpl<O, L, P, S>
where
    O: OrderRepository,
    L: ListOrdersRepository,
    P: ProductRepository,
    S: ShopRepository,
{
    pub fn new(
        order_repo: Arc<O>,
        list_repo: Arc<L>,
        product_repo: Arc<P>,
        shop_repo: Arc<S>,
        groups: Arc<dyn GroupGateway>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            order_repo,
            list_repo,
            product_repo,
            shop_repo,
            groups,
            id_generator,
        }
    }

    async fn find(&self, actor: &Actor, group_id: i64, order_id: i64) -> Result<Order, OrderError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        self.order_repo
            .find_by_id(group_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Check `(product, shop)` pairs against the group's catalogue.
    async fn check_catalogue(&self, group_id: i64, pairs: &[(i64, Option<i64>)]) -> Result<(), OrderError> {
        let product_ids: Vec<i64> = dedup(pairs.iter().map(|(p, _)| *p));
        let found: HashSet<i64> = self
            .product_repo
            .existing_ids(group_id, &product_ids)
            .await?
            .into_iter()
            .collect();
        let missing: Vec<i64> = product_ids.iter().copied().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(OrderError::ProductsNotFound(missing));
        }

        let shop_ids: Vec<i64> = dedup(pairs.iter().filter_map(|(_, s)| *s));
        if shop_ids.is_empty() {
            return Ok(());
        }
        let found: HashSet<i64> = self
            .shop_repo
            .existing_ids(group_id, &shop_ids)
            .await?
            .into_iter()
            .collect();
        let missing: Vec<i64> = shop_ids.into_iter().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(OrderError::ShopsNotFound(missing));
        }

        let sold: HashSet<(i64, i64)> = self
            .product_repo
            .find_shop_prices(&product_ids)
            .await?
            .into_iter()
            .map(|ps| (ps.product_id, ps.shop_id))
            .collect();
        for (product_id, shop_id) in pairs {
            if let Some(shop_id) = shop_id {
                if !sold.contains(&(*product_id, *shop_id)) {
                    return Err(OrderError::ProductNotInShop {
                        product_id: *product_id,
                        shop_id: *shop_id,
                    });
                }
            }
        }
        Ok(())
    }
}

fn dedup(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
impl<O, L, P, S> OrderService for OrderServiceImpl<O, L, P, S>
where
    O: OrderRepository + 'static,
    L: ListOrdersRepository + 'static,
    P: ProductRepository + 'static,
    S: ShopRepository + 'static,
{
    async fn create(
        &self,
        actor: &Actor,
        group_id: i64,
        list_orders_id: i64,
        orders: Vec<OrderDataDto>,
    ) -> Result<Vec<Order>, OrderError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        self.list_repo
            .find_by_id(group_id, list_orders_id)
            .await?
            .ok_or(OrderError::ListNotFound)?;

        let pairs: Vec<(i64, Option<i64>)> = orders.iter().map(|o| (o.product_id, o.shop_id)).collect();
        self.check_catalogue(group_id, &pairs).await?;

        let now = Utc::now();
        let orders: Vec<Order> = orders
            .into_iter()
            .map(|o| Order {
                id: self.id_generator.generate(),
                group_id,
                list_orders_id,
                user_id: Some(actor.user_id),
                product_id: o.product_id,
                shop_id: o.shop_id,
                description: o.description,
                amount: o.amount,
                unit: o.unit,
                bought: false,
                created_at: now,
            })
            .collect();

        let created = self.order_repo.create_many(&orders).await?;
        tracing::debug!(group_id, list_orders_id, count = created.len(), "Orders created");
        Ok(created)
    }

    async fn get(
        &self,
        actor: &Actor,
        group_id: i64,
        query: OrderQuery,
        pagination: Pagination,
    ) -> Result<Page<OrderDetail>, OrderError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        Ok(self.order_repo.find(group_id, query, pagination).await?)
    }

    async fn modify(&self, actor: &Actor, group_id: i64, order_id: i64, update: UpdateOrderDto) -> Result<Order, OrderError> {
        let mut order = self.find(actor, group_id, order_id).await?;

        if update.product_id.is_some() || update.shop_id.is_some() {
            order.product_id = update.product_id.unwrap_or(order.product_id);
            order.shop_id = update.shop_id.or(order.shop_id);
            self.check_catalogue(group_id, &[(order.product_id, order.shop_id)])
                .await?;
        }
        if update.description.is_some() {
            order.description = update.description;
        }
        if let Some(amount) = update.amount {
            order.amount = amount;
        }
        if let Some(unit) = update.unit {
            order.unit = unit;
        }

        Ok(self.order_repo.update(&order).await?)
    }

    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, OrderError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        Ok(self.order_repo.delete(group_id, ids).await?)
    }

    async fn set_bought(&self, actor: &Actor, group_id: i64, order_id: i64, bought: bool) -> Result<Order, OrderError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        self.order_repo
            .set_bought(group_id, order_id, bought)
            .await?
            .ok_or(OrderError::NotFound)
    }
}
