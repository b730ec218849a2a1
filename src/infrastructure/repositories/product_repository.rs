//! Product Repository Implementation
//!
//! PostgreSQL implementation of the ProductRepository trait, including
//! the per-shop prices kept in `product_shops`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Product, ProductQuery, ProductRepository, ProductShop};
use crate::shared::error::{map_db_error, AppError};
use crate::shared::pagination::{like_pattern, Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    group_id: i64,
    name: String,
    description: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: self.id,
            group_id: self.group_id,
            name: self.name,
            description: self.description,
            image: self.image,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductShopRow {
    product_id: i64,
    shop_id: i64,
    price: f64,
    unit: String,
}

impl ProductShopRow {
    fn into_product_shop(self) -> ProductShop {
        ProductShop {
            product_id: self.product_id,
            shop_id: self.shop_id,
            price: self.price,
            unit: self.unit.parse().unwrap_or_default(),
        }
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.group_id, p.name, p.description, p.image, p.created_at";

/// `$1` group, `$2` ids, `$3` shop, `$4` name pattern
const PRODUCT_FILTER: &str = r#"
    p.group_id = $1
    AND ($2::BIGINT[] IS NULL OR p.id = ANY($2))
    AND ($3::BIGINT IS NULL OR EXISTS (
        SELECT 1 FROM product_shops ps WHERE ps.product_id = p.id AND ps.shop_id = $3
    ))
    AND p.name ILIKE $4 ESCAPE '\'
"#;

/// PostgreSQL product repository implementation.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, group_id: i64, id: i64) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products p WHERE p.group_id = $1 AND p.id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(group_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_product()))
    }

    async fn find(&self, group_id: i64, query: ProductQuery, pagination: Pagination) -> Result<Page<Product>, AppError> {
        let pattern = like_pattern(query.filter.as_ref());

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM products p WHERE {}", PRODUCT_FILTER))
            .bind(group_id)
            .bind(&query.ids)
            .bind(query.shop_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products p WHERE {} ORDER BY p.name, p.id LIMIT $5 OFFSET $6",
            PRODUCT_COLUMNS, PRODUCT_FILTER
        ))
        .bind(group_id)
        .bind(&query.ids)
        .bind(query.shop_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(|r| r.into_product()).collect(), total))
    }

    async fn create(&self, product: &Product) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, group_id, name, description, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, group_id, name, description, image, created_at
            "#,
        )
        .bind(product.id)
        .bind(product.group_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A product with this name already exists", "Group not found"))?;

        Ok(row.into_product())
    }

    async fn update(&self, product: &Product) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products SET name = $3, description = $4
            WHERE group_id = $1 AND id = $2
            RETURNING id, group_id, name, description, image, created_at
            "#,
        )
        .bind(product.group_id)
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A product with this name already exists", "Group not found"))?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", product.id)))?;

        Ok(row.into_product())
    }

    async fn delete(&self, group_id: i64, ids: &[i64]) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            DELETE FROM products
            WHERE group_id = $1 AND id = ANY($2)
            RETURNING id, group_id, name, description, image, created_at
            "#,
        )
        .bind(group_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_product()).collect())
    }

    async fn set_image(&self, id: i64, image: Option<String>) -> Result<(), AppError> {
        sqlx::query("UPDATE products SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn existing_ids(&self, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE group_id = $1 AND id = ANY($2)")
            .bind(group_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(found)
    }

    async fn set_shop_prices(&self, product_id: i64, prices: &[ProductShop]) -> Result<Vec<ProductShop>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_shops WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let shop_ids: Vec<i64> = prices.iter().map(|p| p.shop_id).collect();
        let amounts: Vec<f64> = prices.iter().map(|p| p.price).collect();
        let units: Vec<String> = prices.iter().map(|p| p.unit.as_str().to_string()).collect();

        let rows = sqlx::query_as::<_, ProductShopRow>(
            r#"
            INSERT INTO product_shops (product_id, shop_id, price, unit)
            SELECT $1, s.shop_id, s.price, s.unit
            FROM UNNEST($2::BIGINT[], $3::DOUBLE PRECISION[], $4::TEXT[]) AS s(shop_id, price, unit)
            RETURNING product_id, shop_id, price, unit
            "#,
        )
        .bind(product_id)
        .bind(&shop_ids)
        .bind(&amounts)
        .bind(&units)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Duplicated shop price", "Shop not found"))?;

        tx.commit().await?;
        Ok(rows.into_iter().map(|r| r.into_product_shop()).collect())
    }

    async fn find_shop_prices(&self, product_ids: &[i64]) -> Result<Vec<ProductShop>, AppError> {
        let rows = sqlx::query_as::<_, ProductShopRow>(
            r#"
            SELECT product_id, shop_id, price, unit
            FROM product_shops
            WHERE product_id = ANY($1)
            ORDER BY product_id, price
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_product_shop()).collect())
    }
}
