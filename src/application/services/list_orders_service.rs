//! List Orders Service
//!
//! Shopping lists of a group, copying and pricing them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::Actor;
use crate::domain::services::{require_member, GroupGateway};
use crate::domain::{ListOrders, ListOrdersPrice, ListOrdersQuery, ListOrdersRepository, Order, OrderRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};
use crate::shared::snowflake::SnowflakeGenerator;

/// List orders service trait
#[async_trait]
pub trait ListOrdersService: Send + Sync {
    async fn create(&self, actor: &Actor, group_id: i64, list: ListOrdersDataDto) -> Result<ListOrders, ListOrdersError>;

    async fn get(
        &self,
        actor: &Actor,
        group_id: i64,
        query: ListOrdersQuery,
        pagination: Pagination,
    ) -> Result<Page<ListOrders>, ListOrdersError>;

    async fn modify(
        &self,
        actor: &Actor,
        group_id: i64,
        list_orders_id: i64,
        update: UpdateListOrdersDto,
    ) -> Result<ListOrders, ListOrdersError>;

    /// Remove lists with their orders
    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, ListOrdersError>;

    /// Copy a list and its orders under a new name
    async fn create_from(
        &self,
        actor: &Actor,
        group_id: i64,
        list_orders_id: i64,
        copy: CopyListOrdersDto,
    ) -> Result<ListOrders, ListOrdersError>;

    async fn get_price(&self, actor: &Actor, group_id: i64, list_orders_id: i64) -> Result<ListOrdersPrice, ListOrdersError>;
}

#[derive(Debug, Clone)]
pub struct ListOrdersDataDto {
    pub name: String,
    pub description: Option<String>,
    pub date_to_buy: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateListOrdersDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date_to_buy: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct CopyListOrdersDto {
    pub name: String,
    pub description: Option<String>,
    pub date_to_buy: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListOrdersError {
    #[error("List of orders not found")]
    NotFound,

    #[error(transparent)]
    Other(#[from] AppError),
}

impl From<ListOrdersError> for AppError {
    fn from(e: ListOrdersError) -> Self {
        match e {
            ListOrdersError::NotFound => AppError::NotFound(e.to_string()),
            ListOrdersError::Other(e) => e,
        }
    }
}

pub struct ListOrdersServiceImpl<L, O>
where
    L: ListOrdersRepository,
    O: OrderRepository,
{
    list_repo: Arc<L>,
    order_repo: Arc<O>,
    groups: Arc<dyn GroupGateway>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<L, O> ListOrdersServiceImpl<L, O>
where
    L: ListOrdersRepository,
    O: OrderRepository,
{
    pub fn new(
        list_repo: Arc<L>,
        order_repo: Arc<O>,
        groups: Arc<dyn GroupGateway>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            list_repo,
            order_repo,
            groups,
            id_generator,
        }
    }

    async fn find(&self, actor: &Actor, group_id: i64, id: i64) -> Result<ListOrders, ListOrdersError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        self.list_repo
            .find_by_id(group_id, id)
            .await?
            .ok_or(ListOrdersError::NotFound)
    }
}

#[async_trait]
impl<L, O> ListOrdersService for ListOrdersServiceImpl<L, O>
where
    L: ListOrdersRepository + 'static,
    O: OrderRepository + 'static,
{
    async fn create(&self, actor: &Actor, group_id: i64, data: ListOrdersDataDto) -> Result<ListOrders, ListOrdersError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;

        let list = ListOrders {
            id: self.id_generator.generate(),
            group_id,
            user_id: Some(actor.user_id),
            name: data.name.trim().to_string(),
            description: data.description,
            date_to_buy: data.date_to_buy,
            created_at: Utc::now(),
        };
        Ok(self.list_repo.create(&list).await?)
    }

    async fn get(
        &self,
        actor: &Actor,
        group_id: i64,
        query: ListOrdersQuery,
        pagination: Pagination,
    ) -> Result<Page<ListOrders>, ListOrdersError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        Ok(self.list_repo.find(group_id, query, pagination).await?)
    }

    async fn modify(
        &self,
        actor: &Actor,
        group_id: i64,
        list_orders_id: i64,
        update: UpdateListOrdersDto,
    ) -> Result<ListOrders, ListOrdersError> {
        let mut list = self.find(actor, group_id, list_orders_id).await?;
        if let Some(name) = update.name {
            list.name = name.trim().to_string();
        }
        if update.description.is_some() {
            list.description = update.description;
        }
        if update.date_to_buy.is_some() {
            list.date_to_buy = update.date_to_buy;
        }
        Ok(self.list_repo.update(&list).await?)
    }

    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, ListOrdersError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        Ok(self.list_repo.delete(group_id, ids).await?)
    }

    async fn create_from(
        &self,
        actor: &Actor,
        group_id: i64,
        list_orders_id: i64,
        copy: CopyListOrdersDto,
    ) -> Result<ListOrders, ListOrdersError> {
        let source = self.find(actor, group_id, list_orders_id).await?;
        let now = Utc::now();

        let list = ListOrders {
            id: self.id_generator.generate(),
            group_id,
            user_id: Some(actor.user_id),
            name: copy.name.trim().to_string(),
            description: copy.description.or(source.description),
            date_to_buy: copy.date_to_buy.or(source.date_to_buy),
            created_at: now,
        };

        let orders: Vec<Order> = self
            .order_repo
            .find_by_list(source.id)
            .await?
            .into_iter()
            .map(|order| Order {
                id: self.id_generator.generate(),
                list_orders_id: list.id,
                user_id: Some(actor.user_id),
                bought: false,
                created_at: now,
                ..order
            })
            .collect();

        let created = self.list_repo.create_with_orders(&list, &orders).await?;
        tracing::debug!(
            source_id = source.id,
            list_orders_id = created.id,
            orders = orders.len(),
            "List of orders copied"
        );
        Ok(created)
    }

    async fn get_price(&self, actor: &Actor, group_id: i64, list_orders_id: i64) -> Result<ListOrdersPrice, ListOrdersError> {
        let list = self.find(actor, group_id, list_orders_id).await?;
        Ok(self.list_repo.price(list.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::MockGroupGateway;
    use crate::domain::{GroupRole, MockListOrdersRepository, MockOrderRepository, Unit};

    fn list(id: i64) -> ListOrders {
        ListOrders {
            id,
            group_id: 10,
            user_id: Some(2),
            name: "Weekly".into(),
            description: Some("Every monday".into()),
            date_to_buy: NaiveDate::from_ymd_opt(2024, 5, 6),
            created_at: Utc::now(),
        }
    }

    fn order(id: i64, list_orders_id: i64, bought: bool) -> Order {
        Order {
            id,
            group_id: 10,
            list_orders_id,
            user_id: Some(2),
            product_id: 30,
            shop_id: Some(20),
            description: None,
            amount: 2.0,
            unit: Unit::Units,
            bought,
            created_at: Utc::now(),
        }
    }

    fn service(lists: MockListOrdersRepository, orders: MockOrderRepository) -> ListOrdersServiceImpl<MockListOrdersRepository, MockOrderRepository> {
        let mut gateway = MockGroupGateway::new();
        gateway.expect_user_role().returning(|_, _| Ok(Some(GroupRole::User)));
        ListOrdersServiceImpl::new(
            Arc::new(lists),
            Arc::new(orders),
            Arc::new(gateway),
            Arc::new(SnowflakeGenerator::new(1_577_836_800_000, 1, 1)),
        )
    }

    #[tokio::test]
    async fn test_create_records_creator() {
        let mut lists = MockListOrdersRepository::new();
        lists
            .expect_create()
            .withf(|l| l.user_id == Some(1) && l.group_id == 10)
            .returning(|l| Ok(l.clone()));

        service(lists, MockOrderRepository::new())
            .create(
                &Actor::new(1, "t"),
                10,
                ListOrdersDataDto {
                    name: "Weekly".into(),
                    description: None,
                    date_to_buy: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_copy_resets_bought_and_keeps_source_details() {
        let mut lists = MockListOrdersRepository::new();
        lists.expect_find_by_id().returning(|_, id| Ok(Some(list(id))));
        lists
            .expect_create_with_orders()
            .withf(|l, orders| {
                l.id != 5
                    && l.name == "Copy"
                    && l.description.as_deref() == Some("Every monday")
                    && orders.len() == 2
                    && orders.iter().all(|o| !o.bought && o.list_orders_id == l.id && o.id != 100 && o.id != 101)
            })
            .times(1)
            .returning(|l, _| Ok(l.clone()));
        let mut orders = MockOrderRepository::new();
        orders
            .expect_find_by_list()
            .returning(|list_id| Ok(vec![order(100, list_id, true), order(101, list_id, false)]));

        let copy = service(lists, orders)
            .create_from(
                &Actor::new(1, "t"),
                10,
                5,
                CopyListOrdersDto {
                    name: "Copy".into(),
                    description: None,
                    date_to_buy: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(copy.user_id, Some(1));
    }

    #[tokio::test]
    async fn test_price_of_unknown_list() {
        let mut lists = MockListOrdersRepository::new();
        lists.expect_find_by_id().returning(|_, _| Ok(None));
        lists.expect_price().never();

        let result = service(lists, MockOrderRepository::new())
            .get_price(&Actor::new(1, "t"), 10, 5)
            .await;
        assert!(matches!(result, Err(ListOrdersError::NotFound)));
    }

    #[tokio::test]
    async fn test_price() {
        let mut lists = MockListOrdersRepository::new();
        lists.expect_find_by_id().returning(|_, id| Ok(Some(list(id))));
        lists.expect_price().returning(|_| {
            Ok(ListOrdersPrice {
                total: 12.5,
                bought: 2.5,
            })
        });

        let price = service(lists, MockOrderRepository::new())
            .get_price(&Actor::new(1, "t"), 10, 5)
            .await
            .unwrap();
        assert_eq!(price, ListOrdersPrice { total: 12.5, bought: 2.5 });
    }
}
