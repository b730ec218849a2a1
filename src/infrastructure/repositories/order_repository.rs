//! Order Repository Implementation
//!
//! PostgreSQL implementation of the OrderRepository trait. Listings join
//! `products` and `shops` to carry their names.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::domain::{Order, OrderDetail, OrderFilterSection, OrderQuery, OrderRepository};
use crate::shared::error::{map_db_error, AppError};
use crate::shared::pagination::{like_pattern, Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrderRow {
    id: i64,
    group_id: i64,
    list_orders_id: i64,
    user_id: Option<i64>,
    product_id: i64,
    shop_id: Option<i64>,
    description: Option<String>,
    amount: f64,
    unit: String,
    bought: bool,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    pub(super) fn into_order(self) -> Order {
        Order {
            id: self.id,
            group_id: self.group_id,
            list_orders_id: self.list_orders_id,
            user_id: self.user_id,
            product_id: self.product_id,
            shop_id: self.shop_id,
            description: self.description,
            amount: self.amount,
            unit: self.unit.parse().unwrap_or_default(),
            bought: self.bought,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderDetailRow {
    #[sqlx(flatten)]
    order: OrderRow,
    product_name: String,
    shop_name: Option<String>,
}

impl OrderDetailRow {
    fn into_detail(self) -> OrderDetail {
        OrderDetail {
            order: self.order.into_order(),
            product_name: self.product_name,
            shop_name: self.shop_name,
        }
    }
}

const ORDER_COLUMNS: &str = "id, group_id, list_orders_id, user_id, product_id, shop_id, description, \
                             amount, unit, bought, created_at";

const DETAIL_SELECT: &str = r#"
    SELECT o.id, o.group_id, o.list_orders_id, o.user_id, o.product_id, o.shop_id, o.description,
           o.amount, o.unit, o.bought, o.created_at,
           p.name AS product_name, s.name AS shop_name
    FROM orders o
    JOIN products p ON p.id = o.product_id
    LEFT JOIN shops s ON s.id = o.shop_id
"#;

fn filter_column(section: OrderFilterSection) -> &'static str {
    match section {
        OrderFilterSection::Product => "p.name",
        OrderFilterSection::Shop => "COALESCE(s.name, '')",
    }
}

/// Insert orders with a single statement; shared with list copying.
pub(super) async fn insert_orders<'e, E>(executor: E, orders: &[Order]) -> Result<Vec<OrderRow>, AppError>
where
    E: PgExecutor<'e>,
{
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let group_ids: Vec<i64> = orders.iter().map(|o| o.group_id).collect();
    let list_ids: Vec<i64> = orders.iter().map(|o| o.list_orders_id).collect();
    let user_ids: Vec<Option<i64>> = orders.iter().map(|o| o.user_id).collect();
    let product_ids: Vec<i64> = orders.iter().map(|o| o.product_id).collect();
    let shop_ids: Vec<Option<i64>> = orders.iter().map(|o| o.shop_id).collect();
    let descriptions: Vec<Option<String>> = orders.iter().map(|o| o.description.clone()).collect();
    let amounts: Vec<f64> = orders.iter().map(|o| o.amount).collect();
    let units: Vec<String> = orders.iter().map(|o| o.unit.as_str().to_string()).collect();
    let bought: Vec<bool> = orders.iter().map(|o| o.bought).collect();
    let created: Vec<DateTime<Utc>> = orders.iter().map(|o| o.created_at).collect();

    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        r#"
        INSERT INTO orders ({cols})
        SELECT * FROM UNNEST(
            $1::BIGINT[], $2::BIGINT[], $3::BIGINT[], $4::BIGINT[], $5::BIGINT[], $6::BIGINT[],
            $7::TEXT[], $8::DOUBLE PRECISION[], $9::TEXT[], $10::BOOLEAN[], $11::TIMESTAMPTZ[]
        )
        RETURNING {cols}
        "#,
        cols = ORDER_COLUMNS
    ))
    .bind(&ids)
    .bind(&group_ids)
    .bind(&list_ids)
    .bind(&user_ids)
    .bind(&product_ids)
    .bind(&shop_ids)
    .bind(&descriptions)
    .bind(&amounts)
    .bind(&units)
    .bind(&bought)
    .bind(&created)
    .fetch_all(executor)
    .await
    .map_err(|e| map_db_error(e, "Order already exists", "Product, shop or list not found"))?;

    Ok(rows)
}

/// PostgreSQL order repository implementation.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE group_id = $1 AND id = $2",
            ORDER_COLUMNS
        ))
        .bind(group_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_order()))
    }

    async fn find(&self, group_id: i64, query: OrderQuery, pagination: Pagination) -> Result<Page<OrderDetail>, AppError> {
        let pattern = like_pattern(query.filter.as_ref());
        let filter = format!(
            r#"
            o.group_id = $1
            AND ($2::BIGINT[] IS NULL OR o.id = ANY($2))
            AND ($3::BIGINT IS NULL OR o.list_orders_id = $3)
            AND {} ILIKE $4 ESCAPE '\'
            "#,
            filter_column(query.filter_section)
        );

        let total = sqlx::query_scalar::<_, i64>(&format!(
            r#"
            SELECT COUNT(*)
            FROM orders o
            JOIN products p ON p.id = o.product_id
            LEFT JOIN shops s ON s.id = o.shop_id
            WHERE {}
            "#,
            filter
        ))
        .bind(group_id)
        .bind(&query.ids)
        .bind(query.list_orders_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, OrderDetailRow>(&format!(
            "{} WHERE {} ORDER BY o.created_at, o.id LIMIT $5 OFFSET $6",
            DETAIL_SELECT, filter
        ))
        .bind(group_id)
        .bind(&query.ids)
        .bind(query.list_orders_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(|r| r.into_detail()).collect(), total))
    }

    async fn find_by_list(&self, list_orders_id: i64) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE list_orders_id = $1 ORDER BY created_at, id",
            ORDER_COLUMNS
        ))
        .bind(list_orders_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_order()).collect())
    }

    async fn find_details_by_list(&self, list_orders_id: i64) -> Result<Vec<OrderDetail>, AppError> {
        let rows = sqlx::query_as::<_, OrderDetailRow>(&format!(
            "{} WHERE o.list_orders_id = $1 ORDER BY o.created_at, o.id",
            DETAIL_SELECT
        ))
        .bind(list_orders_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_detail()).collect())
    }

    async fn create_many(&self, orders: &[Order]) -> Result<Vec<Order>, AppError> {
        let mut tx = self.pool.begin().await?;
        let rows = insert_orders(&mut *tx, orders).await?;
        tx.commit().await?;

        Ok(rows.into_iter().map(|r| r.into_order()).collect())
    }

    async fn update(&self, order: &Order) -> Result<Order, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET product_id = $3, shop_id = $4, description = $5, amount = $6, unit = $7
            WHERE group_id = $1 AND id = $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order.group_id)
        .bind(order.id)
        .bind(order.product_id)
        .bind(order.shop_id)
        .bind(&order.description)
        .bind(order.amount)
        .bind(order.unit.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Order already exists", "Product or shop not found"))?
        .ok_or_else(|| AppError::NotFound(format!("Order with id {} not found", order.id)))?;

        Ok(row.into_order())
    }

    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let removed = sqlx::query_scalar::<_, i64>(
            "DELETE FROM orders WHERE group_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(group_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(removed)
    }

    async fn set_bought(&self, group_id: i64, id: i64, bought: bool) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET bought = $3 WHERE group_id = $1 AND id = $2 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(group_id)
        .bind(id)
        .bind(bought)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_order()))
    }
}
