//! Application Startup
//!
//! Wires repositories, module gateways and services into the shared
//! state, builds the router and runs the maintenance task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    AuthService, AuthServiceImpl, GroupService, GroupServiceImpl, ListOrdersService, ListOrdersServiceImpl,
    NotificationService, NotificationServiceImpl, OrderService, OrderServiceImpl, ProductService,
    ProductServiceImpl, ShareService, ShareServiceImpl, ShopService, ShopServiceImpl, UserService,
    UserServiceImpl,
};
use crate::config::Settings;
use crate::domain::services::{GroupGateway, ImageStore, NotificationGateway};
use crate::domain::SessionRepository;
use crate::infrastructure::database;
use crate::infrastructure::metrics;
use crate::infrastructure::modules::{HttpGroupGateway, HttpNotificationGateway, ModuleClient, ModuleError};
use crate::infrastructure::repositories::{
    PgGroupRepository, PgListOrdersRepository, PgNotificationRepository, PgOrderRepository, PgProductRepository,
    PgSessionRepository, PgShareRepository, PgShopRepository, PgUserRepository,
};
use crate::infrastructure::storage::LocalImageStorage;
use crate::presentation::http::{handlers, routes};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub settings: Arc<Settings>,
    pub sessions: Arc<PgSessionRepository>,
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub groups: Arc<dyn GroupService>,
    pub products: Arc<dyn ProductService>,
    pub shops: Arc<dyn ShopService>,
    pub list_orders: Arc<dyn ListOrdersService>,
    pub orders: Arc<dyn OrderService>,
    pub shares: Arc<dyn ShareService>,
    pub notifications: Arc<dyn NotificationService>,
}

impl AppState {
    /// Build every service over the given pool.
    ///
    /// Nothing here touches the database, so a lazily connected pool works.
    pub fn new(db: PgPool, settings: Settings) -> Result<Self, ModuleError> {
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.epoch,
            settings.snowflake.machine_id as u64,
            0,
        ));

        let client = ModuleClient::new(&settings.modules)?;
        let group_gateway: Arc<dyn GroupGateway> = Arc::new(HttpGroupGateway::new(client.clone()));
        let notification_gateway: Arc<dyn NotificationGateway> = Arc::new(HttpNotificationGateway::new(client));
        let images: Arc<dyn ImageStore> = Arc::new(LocalImageStorage::new(&settings.uploads));

        let user_repo = Arc::new(PgUserRepository::new(db.clone()));
        let session_repo = Arc::new(PgSessionRepository::new(db.clone()));
        let group_repo = Arc::new(PgGroupRepository::new(db.clone()));
        let product_repo = Arc::new(PgProductRepository::new(db.clone()));
        let shop_repo = Arc::new(PgShopRepository::new(db.clone()));
        let list_repo = Arc::new(PgListOrdersRepository::new(db.clone()));
        let order_repo = Arc::new(PgOrderRepository::new(db.clone()));
        let share_repo = Arc::new(PgShareRepository::new(db.clone()));
        let notification_repo = Arc::new(PgNotificationRepository::new(db.clone()));

        Ok(Self {
            auth: Arc::new(AuthServiceImpl::new(
                user_repo.clone(),
                session_repo.clone(),
                notification_gateway.clone(),
                snowflake.clone(),
                settings.jwt.clone(),
            )),
            users: Arc::new(UserServiceImpl::new(
                user_repo.clone(),
                session_repo.clone(),
                group_repo.clone(),
                images.clone(),
                notification_gateway.clone(),
            )),
            groups: Arc::new(GroupServiceImpl::new(
                group_repo,
                user_repo,
                images.clone(),
                notification_gateway.clone(),
                snowflake.clone(),
            )),
            products: Arc::new(ProductServiceImpl::new(
                product_repo.clone(),
                shop_repo.clone(),
                group_gateway.clone(),
                images.clone(),
                snowflake.clone(),
            )),
            shops: Arc::new(ShopServiceImpl::new(
                shop_repo.clone(),
                group_gateway.clone(),
                images,
                snowflake.clone(),
            )),
            list_orders: Arc::new(ListOrdersServiceImpl::new(
                list_repo.clone(),
                order_repo.clone(),
                group_gateway.clone(),
                snowflake.clone(),
            )),
            orders: Arc::new(OrderServiceImpl::new(
                order_repo.clone(),
                list_repo.clone(),
                product_repo,
                shop_repo,
                group_gateway.clone(),
                snowflake.clone(),
            )),
            shares: Arc::new(ShareServiceImpl::new(
                share_repo,
                list_repo,
                order_repo,
                group_gateway,
                notification_gateway,
                settings.share.clone(),
            )),
            notifications: Arc::new(NotificationServiceImpl::new(notification_repo, snowflake)),
            sessions: session_repo,
            settings: Arc::new(settings),
            db,
        })
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let state = AppState::new(db, settings)?;
        handlers::health::init_server_start();
        spawn_maintenance(state.clone());

        let router = routes::create_router(state.clone());

        let listener = TcpListener::bind(state.settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Periodically drop expired shares, stale sessions, old notifications
/// and groups nobody belongs to.
pub fn spawn_maintenance(state: AppState) {
    let interval_secs = state.settings.maintenance.interval_secs;
    if interval_secs == 0 {
        tracing::info!("Maintenance task disabled");
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            run_maintenance(&state).await;
        }
    });
}

/// One cleanup pass; failures are logged and retried on the next tick.
pub async fn run_maintenance(state: &AppState) {
    match state.shares.remove_expired().await {
        Ok(removed) => metrics::record_maintenance_removed("share_list_orders", removed),
        Err(e) => tracing::error!(error = %e, "Failed to remove expired shares"),
    }

    let retention = state.settings.maintenance.notification_retention_days;
    match state.notifications.remove_older_than(retention).await {
        Ok(removed) => metrics::record_maintenance_removed("notifications", removed),
        Err(e) => tracing::error!(error = %e, "Failed to remove old notifications"),
    }

    match state.groups.remove_orphaned().await {
        Ok(removed) => metrics::record_maintenance_removed("groups", removed),
        Err(e) => tracing::error!(error = %e, "Failed to remove groups without members"),
    }

    match state.sessions.delete_stale().await {
        Ok(removed) => metrics::record_maintenance_removed("user_sessions", removed),
        Err(e) => tracing::error!(error = %e, "Failed to remove stale sessions"),
    }
}
