//! Product Service
//!
//! Products of a group and their per-shop prices.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::Actor;
use crate::domain::services::{discard_image, require_member, GroupGateway, ImageStore};
use crate::domain::{ImageKind, Product, ProductQuery, ProductRepository, ProductShop, ShopRepository, Unit};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};
use crate::shared::snowflake::SnowflakeGenerator;

/// Product service trait
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, actor: &Actor, group_id: i64, product: ProductDataDto) -> Result<Product, ProductError>;

    async fn get(
        &self,
        actor: &Actor,
        group_id: i64,
        query: ProductQuery,
        pagination: Pagination,
    ) -> Result<Page<Product>, ProductError>;

    async fn modify(
        &self,
        actor: &Actor,
        group_id: i64,
        product_id: i64,
        update: UpdateProductDto,
    ) -> Result<Product, ProductError>;

    /// Remove products; returns the removed IDs
    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, ProductError>;

    /// Replace the shop prices of a product
    async fn set_shop_prices(
        &self,
        actor: &Actor,
        group_id: i64,
        product_id: i64,
        prices: Vec<ShopPriceDto>,
    ) -> Result<Vec<ProductShop>, ProductError>;

    async fn get_shop_prices(
        &self,
        actor: &Actor,
        group_id: i64,
        product_ids: &[i64],
    ) -> Result<Vec<ProductShop>, ProductError>;

    async fn set_image(&self, actor: &Actor, group_id: i64, product_id: i64, image: Vec<u8>) -> Result<Product, ProductError>;

    async fn remove_image(&self, actor: &Actor, group_id: i64, product_id: i64) -> Result<Product, ProductError>;
}

#[derive(Debug, Clone)]
pub struct ProductDataDto {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductDto {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopPriceDto {
    pub shop_id: i64,
    pub price: f64,
    pub unit: Unit,
}

/// Product service errors
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("Shops not found: {0:?}")]
    ShopsNotFound(Vec<i64>),

    #[error(transparent)]
    Other(#[from] AppError),
}

impl From<ProductError> for AppError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound | ProductError::ShopsNotFound(_) => AppError::NotFound(e.to_string()),
            ProductError::Other(e) => e,
        }
    }
}

/// ProductService implementation
pub struct ProductServiceImpl<P, S>
where
    P: ProductRepository,
    S: ShopRepository,
{
    product_repo: Arc<P>,
    shop_repo: Arc<S>,
    groups: Arc<dyn GroupGateway>,
    images: Arc<dyn ImageStore>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<P, S> ProductServiceImpl<P, S>
where
    P: ProductRepository,
    S: ShopRepository,
{
    pub fn new(
        product_repo: Arc<P>,
        shop_repo: Arc<S>,
        groups: Arc<dyn GroupGateway>,
        images: Arc<dyn ImageStore>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            product_repo,
            shop_repo,
            groups,
            images,
            id_generator,
        }
    }

    async fn find(&self, actor: &Actor, group_id: i64, product_id: i64) -> Result<Product, ProductError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        self.product_repo
            .find_by_id(group_id, product_id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    async fn replace_image(&self, mut product: Product, image: Option<String>) -> Result<Product, ProductError> {
        if let Err(e) = self.product_repo.set_image(product.id, image.clone()).await {
            discard_image(self.images.as_ref(), image).await;
            return Err(e.into());
        }
        let old = std::mem::replace(&mut product.image, image);
        discard_image(self.images.as_ref(), old).await;
        Ok(product)
    }
}

#[async_trait]
impl<P, S> ProductService for ProductServiceImpl<P, S>
where
    P: ProductRepository + 'static,
    S: ShopRepository + 'static,
{
    async fn create(&self, actor: &Actor, group_id: i64, data: ProductDataDto) -> Result<Product, ProductError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;

        let product = Product {
            id: self.id_generator.generate(),
            group_id,
            name: data.name.trim().to_string(),
            description: data.description,
            image: None,
            created_at: Utc::now(),
        };
        Ok(self.product_repo.create(&product).await?)
    }

    async fn get(
        &self,
        actor: &Actor,
        group_id: i64,
        query: ProductQuery,
        pagination: Pagination,
    ) -> Result<Page<Product>, ProductError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        Ok(self.product_repo.find(group_id, query, pagination).await?)
    }

    async fn modify(
        &self,
        actor: &Actor,
        group_id: i64,
        product_id: i64,
        update: UpdateProductDto,
    ) -> Result<Product, ProductError> {
        let mut product = self.find(actor, group_id, product_id).await?;
        if let Some(name) = update.name {
            product.name = name.trim().to_string();
        }
        if update.description.is_some() {
            product.description = update.description;
        }
        Ok(self.product_repo.update(&product).await?)
    }

    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, ProductError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;

        let removed = self.product_repo.delete(group_id, ids).await?;
        for product in &removed {
            discard_image(self.images.as_ref(), product.image.clone()).await;
        }
        tracing::debug!(group_id, removed = removed.len(), "Products removed");
        Ok(removed.into_iter().map(|p| p.id).collect())
    }

    async fn set_shop_prices(
        &self,
        actor: &Actor,
        group_id: i64,
        product_id: i64,
        prices: Vec<ShopPriceDto>,
    ) -> Result<Vec<ProductShop>, ProductError> {
        self.find(actor, group_id, product_id).await?;

        let shop_ids: Vec<i64> = prices.iter().map(|p| p.shop_id).collect();
        if !shop_ids.is_empty() {
            let existing: HashSet<i64> = self
                .shop_repo
                .existing_ids(group_id, &shop_ids)
                .await?
                .into_iter()
                .collect();
            let missing: Vec<i64> = shop_ids.into_iter().filter(|id| !existing.contains(id)).collect();
            if !missing.is_empty() {
                return Err(ProductError::ShopsNotFound(missing));
            }
        }

        let rows: Vec<ProductShop> = prices
            .into_iter()
            .map(|p| ProductShop {
                product_id,
                shop_id: p.shop_id,
                price: p.price,
                unit: p.unit,
            })
            .collect();
        Ok(self.product_repo.set_shop_prices(product_id, &rows).await?)
    }

    async fn get_shop_prices(
        &self,
        actor: &Actor,
        group_id: i64,
        product_ids: &[i64],
    ) -> Result<Vec<ProductShop>, ProductError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;

        let own = self.product_repo.existing_ids(group_id, product_ids).await?;
        if own.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.product_repo.find_shop_prices(&own).await?)
    }

    async fn set_image(&self, actor: &Actor, group_id: i64, product_id: i64, image: Vec<u8>) -> Result<Product, ProductError> {
        let product = self.find(actor, group_id, product_id).await?;
        let path = self.images.store(ImageKind::Product, image).await?;
        self.replace_image(product, Some(path)).await
    }

    async fn remove_image(&self, actor: &Actor, group_id: i64, product_id: i64) -> Result<Product, ProductError> {
        let product = self.find(actor, group_id, product_id).await?;
        self.replace_image(product, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::{MockGroupGateway, MockImageStore};
    use crate::domain::{GroupRole, MockProductRepository, MockShopRepository};

    fn actor() -> Actor {
        Actor::new(1, "token")
    }

    fn member_gateway() -> MockGroupGateway {
        let mut gateway = MockGroupGateway::new();
        gateway.expect_user_role().returning(|_, _| Ok(Some(GroupRole::User)));
        gateway
    }

    fn product(id: i64, image: Option<&str>) -> Product {
        Product {
            id,
            group_id: 10,
            name: "Milk".into(),
            description: None,
            image: image.map(String::from),
            created_at: Utc::now(),
        }
    }

    fn service(
        products: MockProductRepository,
        shops: MockShopRepository,
        gateway: MockGroupGateway,
        images: MockImageStore,
    ) -> ProductServiceImpl<MockProductRepository, MockShopRepository> {
        ProductServiceImpl::new(
            Arc::new(products),
            Arc::new(shops),
            Arc::new(gateway),
            Arc::new(images),
            Arc::new(SnowflakeGenerator::new(1_577_836_800_000, 1, 1)),
        )
    }

    #[tokio::test]
    async fn test_non_member_is_forbidden() {
        let mut gateway = MockGroupGateway::new();
        gateway.expect_user_role().returning(|_, _| Ok(None));
        let mut products = MockProductRepository::new();
        products.expect_create().never();

        let result = service(products, MockShopRepository::new(), gateway, MockImageStore::new())
            .create(
                &actor(),
                10,
                ProductDataDto {
                    name: "Milk".into(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ProductError::Other(AppError::Forbidden(_)))));
    }

    #[tokio::test]
    async fn test_create_product_in_group() {
        let mut products = MockProductRepository::new();
        products
            .expect_create()
            .withf(|p| p.group_id == 10 && p.name == "Milk")
            .returning(|p| Ok(p.clone()));

        let created = service(products, MockShopRepository::new(), member_gateway(), MockImageStore::new())
            .create(
                &actor(),
                10,
                ProductDataDto {
                    name: "Milk ".into(),
                    description: Some("Whole".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.description.as_deref(), Some("Whole"));
    }

    #[tokio::test]
    async fn test_shop_prices_require_group_shops() {
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|_, id| Ok(Some(product(id, None))));
        products.expect_set_shop_prices().never();
        let mut shops = MockShopRepository::new();
        shops.expect_existing_ids().returning(|_, _| Ok(vec![20]));

        let result = service(products, shops, member_gateway(), MockImageStore::new())
            .set_shop_prices(
                &actor(),
                10,
                1,
                vec![
                    ShopPriceDto { shop_id: 20, price: 1.5, unit: Unit::L },
                    ShopPriceDto { shop_id: 21, price: 1.2, unit: Unit::L },
                ],
            )
            .await;
        assert!(matches!(result, Err(ProductError::ShopsNotFound(ids)) if ids == vec![21]));
    }

    #[tokio::test]
    async fn test_set_shop_prices_replaces_rows() {
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|_, id| Ok(Some(product(id, None))));
        products
            .expect_set_shop_prices()
            .withf(|id, rows| *id == 1 && rows.len() == 1 && rows[0].shop_id == 20)
            .returning(|_, rows| Ok(rows.to_vec()));
        let mut shops = MockShopRepository::new();
        shops.expect_existing_ids().returning(|_, ids| Ok(ids.to_vec()));

        let rows = service(products, shops, member_gateway(), MockImageStore::new())
            .set_shop_prices(
                &actor(),
                10,
                1,
                vec![ShopPriceDto { shop_id: 20, price: 0.99, unit: Unit::Units }],
            )
            .await
            .unwrap();
        assert_eq!(rows[0].price, 0.99);
    }

    #[tokio::test]
    async fn test_remove_discards_images() {
        let mut products = MockProductRepository::new();
        products
            .expect_delete()
            .returning(|_, _| Ok(vec![product(1, Some("/uploads/products/a.png")), product(2, None)]));
        let mut images = MockImageStore::new();
        images.expect_remove().times(1).returning(|_| Ok(()));

        let removed = service(products, MockShopRepository::new(), member_gateway(), images)
            .remove(&actor(), 10, &[1, 2, 3])
            .await
            .unwrap();
        assert_eq!(removed, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_modify_unknown_product() {
        let mut products = MockProductRepository::new();
        products.expect_find_by_id().returning(|_, _| Ok(None));

        let result = service(products, MockShopRepository::new(), member_gateway(), MockImageStore::new())
            .modify(&actor(), 10, 1, UpdateProductDto::default())
            .await;
        assert!(matches!(result, Err(ProductError::NotFound)));
    }
}
