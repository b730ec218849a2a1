//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Log output configuration
    pub log: LogSettings,

    /// Inter-module HTTP client configuration
    pub modules: ModulesSettings,

    /// Image upload storage
    pub uploads: UploadSettings,

    /// List sharing configuration
    pub share: ShareSettings,

    /// Periodic cleanup task
    pub maintenance: MaintenanceSettings,

    /// Pagination limits
    pub pagination: PaginationSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-31)
    pub machine_id: u16,

    /// Custom epoch timestamp in milliseconds
    pub epoch: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Log configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
}

/// Inter-module communication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModulesSettings {
    /// Base URL other modules are reached at (e.g. "http://127.0.0.1:3000")
    pub base_url: String,

    /// Shared key sent in `X-Module-Key` for internal endpoints
    pub internal_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Image upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Directory images are written to
    pub dir: String,

    /// Public path prefix images are served from
    pub public_url: String,

    /// Maximum accepted image size in bytes
    pub max_size_bytes: usize,
}

/// Share link configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareSettings {
    /// Days a share link stays valid
    pub expiration_days: i64,

    /// Public URL prefix the share token is appended to
    pub public_url: String,
}

/// Maintenance task configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceSettings {
    /// Seconds between cleanup runs (0 disables the task)
    pub interval_secs: u64,

    /// Notifications older than this are removed
    pub notification_retention_days: i64,
}

/// Pagination configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    pub max_page_items: u32,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Minimum required length for the inter-module key
pub const MIN_MODULE_KEY_LENGTH: usize = 16;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if one of the secrets is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("jwt.access_token_expiry_minutes", 15)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("snowflake.machine_id", 1)?
            .set_default("snowflake.epoch", 1_577_836_800_000_u64)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("log.format", "pretty")?
            .set_default("modules.base_url", "http://127.0.0.1:3000")?
            .set_default("modules.timeout_secs", 10)?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.public_url", "/uploads")?
            .set_default("uploads.max_size_bytes", 2_097_152_i64)? // 2MB
            .set_default("share.expiration_days", 7)?
            .set_default("share.public_url", "http://localhost:3000/api/v1/shares")?
            .set_default("maintenance.interval_secs", 3600)?
            .set_default("maintenance.notification_retention_days", 90)?
            .set_default("pagination.max_page_items", 100)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("modules.base_url", std::env::var("MODULES_BASE_URL").ok())?
            .set_override_option(
                "modules.internal_key",
                std::env::var("MODULES_INTERNAL_KEY").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    /// Check invariants the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }
        if self.modules.internal_key.len() < MIN_MODULE_KEY_LENGTH {
            return Err(ConfigError::Message(format!(
                "Module internal key must be at least {} characters",
                MIN_MODULE_KEY_LENGTH
            )));
        }
        if self.uploads.max_size_bytes == 0 {
            return Err(ConfigError::Message(
                "uploads.max_size_bytes must be greater than zero".into(),
            ));
        }
        if self.pagination.max_page_items == 0 {
            return Err(ConfigError::Message(
                "pagination.max_page_items must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Settings suitable for unit tests; never touches the environment.
    pub fn test_settings() -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".into(),
                port: 0,
            },
            database: DatabaseSettings {
                url: "postgres://localhost/shopping_test".into(),
                max_connections: 1,
                min_connections: 0,
                acquire_timeout: 1,
                run_migrations: false,
            },
            jwt: JwtSettings {
                secret: "a-test-secret-that-is-long-enough-123".into(),
                access_token_expiry_minutes: 15,
                refresh_token_expiry_days: 7,
            },
            snowflake: SnowflakeSettings {
                machine_id: 1,
                epoch: 1_577_836_800_000,
            },
            cors: CorsSettings {
                allowed_origins: vec![],
            },
            log: LogSettings {
                format: LogFormat::Pretty,
            },
            modules: ModulesSettings {
                base_url: "http://127.0.0.1:1".into(),
                internal_key: "internal-module-key-0123".into(),
                timeout_secs: 1,
            },
            uploads: UploadSettings {
                dir: "uploads".into(),
                public_url: "/uploads".into(),
                max_size_bytes: 1024,
            },
            share: ShareSettings {
                expiration_days: 7,
                public_url: "http://localhost/api/v1/shares".into(),
            },
            maintenance: MaintenanceSettings {
                interval_secs: 0,
                notification_retention_days: 90,
            },
            pagination: PaginationSettings { max_page_items: 100 },
            environment: "test".into(),
        }
    }

    #[test]
    fn test_valid_settings_pass_validation() {
        assert!(test_settings().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let mut settings = test_settings();
        settings.jwt.secret = "short".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_short_module_key_is_rejected() {
        let mut settings = test_settings();
        settings.modules.internal_key = "key".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_upload_size_is_rejected() {
        let mut settings = test_settings();
        settings.uploads.max_size_bytes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(test_settings().server_addr(), "127.0.0.1:0");
    }
}
