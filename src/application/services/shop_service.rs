//! Shop Service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::Actor;
use crate::domain::services::{discard_image, require_member, GroupGateway, ImageStore};
use crate::domain::{ImageKind, Shop, ShopQuery, ShopRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, Pagination};
use crate::shared::snowflake::SnowflakeGenerator;

/// Shop service trait
#[async_trait]
pub trait ShopService: Send + Sync {
    async fn create(&self, actor: &Actor, group_id: i64, shop: ShopDataDto) -> Result<Shop, ShopError>;

    async fn get(&self, actor: &Actor, group_id: i64, query: ShopQuery, pagination: Pagination) -> Result<Page<Shop>, ShopError>;

    async fn modify(&self, actor: &Actor, group_id: i64, shop_id: i64, update: UpdateShopDto) -> Result<Shop, ShopError>;

    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, ShopError>;

    async fn set_image(&self, actor: &Actor, group_id: i64, shop_id: i64, image: Vec<u8>) -> Result<Shop, ShopError>;

    async fn remove_image(&self, actor: &Actor, group_id: i64, shop_id: i64) -> Result<Shop, ShopError>;
}

#[derive(Debug, Clone)]
pub struct ShopDataDto {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateShopDto {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("Shop not found")]
    NotFound,

    #[error(transparent)]
    Other(#[from] AppError),
}

impl From<ShopError> for AppError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::NotFound => AppError::NotFound(e.to_string()),
            ShopError::Other(e) => e,
        }
    }
}

pub struct ShopServiceImpl<S>
where
    S: ShopRepository,
{
    shop_repo: Arc<S>,
    groups: Arc<dyn GroupGateway>,
    images: Arc<dyn ImageStore>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<S> ShopServiceImpl<S>
where
    S: ShopRepository,
{
    pub fn new(
        shop_repo: Arc<S>,
        groups: Arc<dyn GroupGateway>,
        images: Arc<dyn ImageStore>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            shop_repo,
            groups,
            images,
            id_generator,
        }
    }

    async fn find(&self, actor: &Actor, group_id: i64, shop_id: i64) -> Result<Shop, ShopError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        self.shop_repo
            .find_by_id(group_id, shop_id)
            .await?
            .ok_or(ShopError::NotFound)
    }

    async fn replace_image(&self, mut shop: Shop, image: Option<String>) -> Result<Shop, ShopError> {
        if let Err(e) = self.shop_repo.set_image(shop.id, image.clone()).await {
            discard_image(self.images.as_ref(), image).await;
            return Err(e.into());
        }
        let old = std::mem::replace(&mut shop.image, image);
        discard_image(self.images.as_ref(), old).await;
        Ok(shop)
    }
}

#[async_trait]
impl<S> ShopService for ShopServiceImpl<S>
where
    S: ShopRepository + 'static,
{
    async fn create(&self, actor: &Actor, group_id: i64, data: ShopDataDto) -> Result<Shop, ShopError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;

        let shop = Shop {
            id: self.id_generator.generate(),
            group_id,
            name: data.name.trim().to_string(),
            address: data.address,
            description: data.description,
            image: None,
            created_at: Utc::now(),
        };
        Ok(self.shop_repo.create(&shop).await?)
    }

    async fn get(&self, actor: &Actor, group_id: i64, query: ShopQuery, pagination: Pagination) -> Result<Page<Shop>, ShopError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;
        Ok(self.shop_repo.find(group_id, query, pagination).await?)
    }

    async fn modify(&self, actor: &Actor, group_id: i64, shop_id: i64, update: UpdateShopDto) -> Result<Shop, ShopError> {
        let mut shop = self.find(actor, group_id, shop_id).await?;
        if let Some(name) = update.name {
            shop.name = name.trim().to_string();
        }
        if update.address.is_some() {
            shop.address = update.address;
        }
        if update.description.is_some() {
            shop.description = update.description;
        }
        Ok(self.shop_repo.update(&shop).await?)
    }

    async fn remove(&self, actor: &Actor, group_id: i64, ids: &[i64]) -> Result<Vec<i64>, ShopError> {
        require_member(self.groups.as_ref(), &actor.token, group_id).await?;

        let removed = self.shop_repo.delete(group_id, ids).await?;
        for shop in &removed {
            discard_image(self.images.as_ref(), shop.image.clone()).await;
        }
        Ok(removed.into_iter().map(|s| s.id).collect())
    }

    async fn set_image(&self, actor: &Actor, group_id: i64, shop_id: i64, image: Vec<u8>) -> Result<Shop, ShopError> {
        let shop = self.find(actor, group_id, shop_id).await?;
        let path = self.images.store(ImageKind::Shop, image).await?;
        self.replace_image(shop, Some(path)).await
    }

    async fn remove_image(&self, actor: &Actor, group_id: i64, shop_id: i64) -> Result<Shop, ShopError> {
        let shop = self.find(actor, group_id, shop_id).await?;
        self.replace_image(shop, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::{MockGroupGateway, MockImageStore};
    use crate::domain::{GroupRole, MockShopRepository};

    fn shop(image: Option<&str>) -> Shop {
        Shop {
            id: 20,
            group_id: 10,
            name: "Corner".into(),
            address: None,
            description: None,
            image: image.map(String::from),
            created_at: Utc::now(),
        }
    }

    fn service(shops: MockShopRepository, images: MockImageStore) -> ShopServiceImpl<MockShopRepository> {
        let mut gateway = MockGroupGateway::new();
        gateway.expect_user_role().returning(|_, _| Ok(Some(GroupRole::Admin)));
        ShopServiceImpl::new(
            Arc::new(shops),
            Arc::new(gateway),
            Arc::new(images),
            Arc::new(SnowflakeGenerator::new(1_577_836_800_000, 1, 1)),
        )
    }

    #[tokio::test]
    async fn test_modify_keeps_unset_fields() {
        let mut shops = MockShopRepository::new();
        shops.expect_find_by_id().returning(|_, _| {
            let mut s = shop(None);
            s.address = Some("Main st. 1".into());
            Ok(Some(s))
        });
        shops.expect_update().returning(|s| Ok(s.clone()));

        let updated = service(shops, MockImageStore::new())
            .modify(
                &Actor::new(1, "t"),
                10,
                20,
                UpdateShopDto {
                    name: Some("Market".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Market");
        assert_eq!(updated.address.as_deref(), Some("Main st. 1"));
    }

    #[tokio::test]
    async fn test_remove_image_discards_file() {
        let mut shops = MockShopRepository::new();
        shops
            .expect_find_by_id()
            .returning(|_, _| Ok(Some(shop(Some("/uploads/shops/x.webp")))));
        shops.expect_set_image().returning(|_, _| Ok(()));
        let mut images = MockImageStore::new();
        images
            .expect_remove()
            .withf(|p| p == "/uploads/shops/x.webp")
            .times(1)
            .returning(|_| Ok(()));

        let updated = service(shops, images)
            .remove_image(&Actor::new(1, "t"), 10, 20)
            .await
            .unwrap();
        assert!(updated.image.is_none());
    }

    #[tokio::test]
    async fn test_unknown_shop() {
        let mut shops = MockShopRepository::new();
        shops.expect_find_by_id().returning(|_, _| Ok(None));

        let result = service(shops, MockImageStore::new())
            .remove_image(&Actor::new(1, "t"), 10, 20)
            .await;
        assert!(matches!(result, Err(ShopError::NotFound)));
    }
}
