//! Shop Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Shop, ShopQuery, ShopRepository};
use crate::shared::error::{map_db_error, AppError};
use crate::shared::pagination::{like_pattern, Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i64,
    group_id: i64,
    name: String,
    address: Option<String>,
    description: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl ShopRow {
    fn into_shop(self) -> Shop {
        Shop {
            id: self.id,
            group_id: self.group_id,
            name: self.name,
            address: self.address,
            description: self.description,
            image: self.image,
            created_at: self.created_at,
        }
    }
}

const SHOP_COLUMNS: &str = "s.id, s.group_id, s.name, s.address, s.description, s.image, s.created_at";

/// `$1` group, `$2` ids, `$3` product, `$4` name pattern
const SHOP_FILTER: &str = r#"
    s.group_id = $1
    AND ($2::BIGINT[] IS NULL OR s.id = ANY($2))
    AND ($3::BIGINT IS NULL OR EXISTS (
        SELECT 1 FROM product_shops ps WHERE ps.shop_id = s.id AND ps.product_id = $3
    ))
    AND s.name ILIKE $4 ESCAPE '\'
"#;

/// PostgreSQL shop repository implementation.
#[derive(Clone)]
pub struct PgShopRepository {
    pool: PgPool,
}

impl PgShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopRepository for PgShopRepository {
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<Shop>, AppError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {} FROM shops s WHERE s.group_id = $1 AND s.id = $2",
            SHOP_COLUMNS
        ))
        .bind(group_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_shop()))
    }

    async fn find(&self, group_id: i64, query: ShopQuery, pagination: Pagination) -> Result<Page<Shop>, AppError> {
        let pattern = like_pattern(query.filter.as_ref());

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM shops s WHERE {}", SHOP_FILTER))
            .bind(group_id)
            .bind(&query.ids)
            .bind(query.product_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {} FROM shops s WHERE {} ORDER BY s.name, s.id LIMIT $5 OFFSET $6",
            SHOP_COLUMNS, SHOP_FILTER
        ))
        .bind(group_id)
        .bind(&query.ids)
        .bind(query.product_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(|r| r.into_shop()).collect(), total))
    }

    async fn create(&self, shop: &Shop) -> Result<Shop, AppError> {
        let row = sqlx::query_as::<_, ShopRow>(
            r#"
            INSERT INTO shops (id, group_id, name, address, description, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, group_id, name, address, description, image, created_at
            "#,
        )
        .bind(shop.id)
        .bind(shop.group_id)
        .bind(&shop.name)
        .bind(&shop.address)
        .bind(&shop.description)
        .bind(&shop.image)
        .bind(shop.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A shop with this name already exists", "Group not found"))?;

        Ok(row.into_shop())
    }

    async fn update(&self, shop: &Shop) -> Result<Shop, AppError> {
        let row = sqlx::query_as::<_, ShopRow>(
            r#"
            UPDATE shops SET name = $3, address = $4, description = $5
            WHERE group_id = $1 AND id = $2
            RETURNING id, group_id, name, address, description, image, created_at
            "#,
        )
        .bind(shop.group_id)
        .bind(shop.id)
        .bind(&shop.name)
        .bind(&shop.address)
        .bind(&shop.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A shop with this name already exists", "Group not found"))?
        .ok_or_else(|| AppError::NotFound(format!("Shop with id {} not found", shop.id)))?;

        Ok(row.into_shop())
    }

    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<Shop>, AppError> {
        let rows = sqlx::query_as::<_, ShopRow>(
            r#"
            DELETE FROM shops
            WHERE group_id = $1 AND id = ANY($2)
            RETURNING id, group_id, name, address, description, image, created_at
            "#,
        )
        .bind(group_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_shop()).collect())
    }

    async fn set_image(&self, id: i64, image: Option<String>) -> Result<(), AppError> {
        sqlx::query("UPDATE shops SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn existing_ids(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM shops WHERE group_id = $1 AND id = ANY($2)")
            .bind(group_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(found)
    }
}
