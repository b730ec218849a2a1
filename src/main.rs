//! # Shopping API
//!
//! Shared shopping lists backend.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Database connection pool and migrations
//! - HTTP server and maintenance task

use anyhow::Result;
use tracing::info;

use shopping_api::config::Settings;
use shopping_api::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: the log format is part of it
    let settings = Settings::load()?;
    shopping_api::telemetry::init_tracing(settings.log.format);

    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
