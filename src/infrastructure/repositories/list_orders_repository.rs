//! ListOrders Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::order_repository::insert_orders;
use crate::domain::{ListOrders, ListOrdersPrice, ListOrdersQuery, ListOrdersRepository, Order};
use crate::shared::error::{map_db_error, AppError};
use crate::shared::pagination::{like_pattern, Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct ListOrdersRow {
    id: i64,
    group_id: i64,
    user_id: Option<i64>,
    name: String,
    description: Option<String>,
    date_to_buy: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl ListOrdersRow {
    fn into_list(self) -> ListOrders {
        ListOrders {
            id: self.id,
            group_id: self.group_id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            date_to_buy: self.date_to_buy,
            created_at: self.created_at,
        }
    }
}

const LIST_COLUMNS: &str = "id, group_id, user_id, name, description, date_to_buy, created_at";

const NAME_TAKEN: &str = "A list of orders with this name already exists";

/// PostgreSQL list-of-orders repository implementation.
#[derive(Clone)]
pub struct PgListOrdersRepository {
    pool: PgPool,
}

impl PgListOrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListOrdersRepository for PgListOrdersRepository {
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<ListOrders>, AppError> {
        let row = sqlx::query_as::<_, ListOrdersRow>(&format!(
            "SELECT {} FROM list_orders WHERE group_id = $1 AND id = $2",
            LIST_COLUMNS
        ))
        .bind(group_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_list()))
    }

    async fn find(
        &self,
        group_id: i64,
        query: ListOrdersQuery,
        pagination: Pagination,
    ) -> Result<Page<ListOrders>, AppError> {
        let pattern = like_pattern(query.filter.as_ref());
        let filter = r#"
            group_id = $1
            AND ($2::BIGINT[] IS NULL OR id = ANY($2))
            AND name ILIKE $3 ESCAPE '\'
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM list_orders WHERE {}", filter))
            .bind(group_id)
            .bind(&query.ids)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ListOrdersRow>(&format!(
            "SELECT {} FROM list_orders WHERE {} ORDER BY date_to_buy NULLS LAST, name, id LIMIT $4 OFFSET $5",
            LIST_COLUMNS, filter
        ))
        .bind(group_id)
        .bind(&query.ids)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(|r| r.into_list()).collect(), total))
    }

    async fn create(&self, list: &ListOrders) -> Result<ListOrders, AppError> {
        let row = sqlx::query_as::<_, ListOrdersRow>(&format!(
            r#"
            INSERT INTO list_orders ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {cols}
            "#,
            cols = LIST_COLUMNS
        ))
        .bind(list.id)
        .bind(list.group_id)
        .bind(list.user_id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.date_to_buy)
        .bind(list.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, NAME_TAKEN, "Group not found"))?;

        Ok(row.into_list())
    }

    async fn update(&self, list: &ListOrders) -> Result<ListOrders, AppError> {
        let row = sqlx::query_as::<_, ListOrdersRow>(&format!(
            r#"
            UPDATE list_orders SET name = $3, description = $4, date_to_buy = $5
            WHERE group_id = $1 AND id = $2
            RETURNING {}
            "#,
            LIST_COLUMNS
        ))
        .bind(list.group_id)
        .bind(list.id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.date_to_buy)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, NAME_TAKEN, "Group not found"))?
        .ok_or_else(|| AppError::NotFound(format!("List of orders with id {} not found", list.id)))?;

        Ok(row.into_list())
    }

    /// Orders go with the list through `ON DELETE CASCADE`.
    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let removed = sqlx::query_scalar::<_, i64>(
            "DELETE FROM list_orders WHERE group_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(group_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(removed)
    }

    async fn create_with_orders(&self, list: &ListOrders, orders: &[Order]) -> Result<ListOrders, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ListOrdersRow>(&format!(
            r#"
            INSERT INTO list_orders ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {cols}
            "#,
            cols = LIST_COLUMNS
        ))
        .bind(list.id)
        .bind(list.group_id)
        .bind(list.user_id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.date_to_buy)
        .bind(list.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, NAME_TAKEN, "Group not found"))?;

        insert_orders(&mut *tx, orders).await?;
        tx.commit().await?;

        Ok(row.into_list())
    }

    async fn price(&self, id: i64) -> Result<ListOrdersPrice, AppError> {
        let (total, bought) = sqlx::query_as::<_, (f64, f64)>(
            r#"
            SELECT COALESCE(SUM(o.amount * ps.price), 0)::DOUBLE PRECISION,
                   COALESCE(SUM(o.amount * ps.price) FILTER (WHERE o.bought), 0)::DOUBLE PRECISION
            FROM orders o
            JOIN product_shops ps ON ps.product_id = o.product_id AND ps.shop_id = o.shop_id
            WHERE o.list_orders_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ListOrdersPrice { total, bought })
    }
}
