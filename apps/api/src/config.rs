//! API server configuration module.
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Built-in defaults        (AppConfig::default())                     │
//! │  2. TOML file                ./mostrador.toml, or $MOSTRADOR_CONFIG     │
//! │  3. Environment variables    MOSTRADOR__SERVER__PORT=8080               │
//! │                                                                         │
//! │  Later sources override earlier ones, key by key.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [server]
//! port = 8080
//!
//! [store]
//! name = "Abarrotes La Esperanza"
//! utc_offset_minutes = -360
//!
//! [sales]
//! price_source = "catalog"
//! ```

use std::env;
use std::time::Duration;

use ::config::{Config, ConfigBuilder, Environment, File};
use ::config::builder::DefaultState;
use mostrador_core::{PriceSource, TaxRate};
use mostrador_db::DbConfig;
use serde::{Deserialize, Serialize};

/// File read when `MOSTRADOR_CONFIG` is not set. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "mostrador.toml";

/// Environment variable naming an explicit config file. Required if set.
pub const CONFIG_PATH_ENV: &str = "MOSTRADOR_CONFIG";

/// Prefix for environment overrides (`MOSTRADOR__SECTION__KEY`).
const ENV_PREFIX: &str = "MOSTRADOR";
const ENV_SEPARATOR: &str = "__";

/// Largest UTC offset in use anywhere (UTC+14 / UTC-12 fit inside ±14h).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

// =============================================================================
// Sections
// =============================================================================

/// Full server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sales: SalesConfig,
    pub store: StoreConfig,
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long in-flight requests and pooled connections get after a
    /// shutdown signal.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            shutdown_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// SQLite file and pool bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: "./mostrador.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

/// Checkout rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesConfig {
    /// IVA in basis points (1600 = 16%).
    pub tax_rate_bps: u32,
    pub price_source: PriceSource,
}

impl Default for SalesConfig {
    fn default() -> Self {
        SalesConfig {
            tax_rate_bps: mostrador_core::DEFAULT_TAX_RATE_BPS,
            price_source: PriceSource::Request,
        }
    }
}

/// Store identity and local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    /// Offset of the store's wall clock from UTC; decides which business
    /// date a sale is booked under.
    pub utc_offset_minutes: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: "Mostrador".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

/// Defaults for report queries that omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub expiring_within_days: u32,
    pub top_sellers_limit: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        ReportsConfig {
            expiring_within_days: 30,
            top_sellers_limit: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl AppConfig {
    /// Load configuration from file and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => File::with_name(&path).required(true),
            Err(_) => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR),
        );

        Self::from_builder(builder)
    }

    /// Builds and validates a configuration from arbitrary sources.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.port",
                reason: "must be non-zero".to_string(),
            });
        }

        if self.database.min_connections < 1 {
            return Err(ConfigError::InvalidValue {
                key: "database.min_connections",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::InvalidValue {
                key: "database.max_connections",
                reason: format!(
                    "must be at least min_connections ({})",
                    self.database.min_connections
                ),
            });
        }

        mostrador_core::validation::validate_tax_rate_bps(self.sales.tax_rate_bps).map_err(|e| {
            ConfigError::InvalidValue {
                key: "sales.tax_rate_bps",
                reason: e.to_string(),
            }
        })?;

        if self.store.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidValue {
                key: "store.utc_offset_minutes",
                reason: format!("must be within ±{}", MAX_UTC_OFFSET_MINUTES),
            });
        }

        Ok(())
    }

    /// Pool settings for [`mostrador_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .acquire_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.database.idle_timeout_secs))
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.sales.tax_rate_bps)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_empty_source_yields_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.tax_rate().bps(), 1600);
        assert_eq!(config.sales.price_source, PriceSource::Request);
    }

    #[test]
    fn test_file_overrides_single_keys() {
        let config = from_toml(
            r#"
            [server]
            port = 8080

            [sales]
            price_source = "catalog"

            [store]
            utc_offset_minutes = -360

            [logging]
            format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.sales.price_source, PriceSource::Catalog);
        assert_eq!(config.sales.tax_rate_bps, 1600);
        assert_eq!(config.store.utc_offset_minutes, -360);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_rejects_invalid_values() {
        for toml in [
            "[server]\nport = 0",
            "[database]\nmin_connections = 0",
            "[database]\nmax_connections = 2\nmin_connections = 3",
            "[sales]\ntax_rate_bps = 10001",
            "[store]\nutc_offset_minutes = 900",
        ] {
            assert!(
                matches!(from_toml(toml), Err(ConfigError::InvalidValue { .. })),
                "accepted: {toml}"
            );
        }
    }

    #[test]
    fn test_unknown_price_source_fails_to_load() {
        assert!(matches!(
            from_toml("[sales]\nprice_source = \"cashier\""),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_db_config_carries_pool_bounds() {
        let mut config = AppConfig::default();
        config.database.path = "/tmp/tienda.db".to_string();
        config.database.max_connections = 8;

        let db = config.db_config();
        assert_eq!(db.database_path, std::path::PathBuf::from("/tmp/tienda.db"));
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.acquire_timeout, Duration::from_secs(30));
    }
}
