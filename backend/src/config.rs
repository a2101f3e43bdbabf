//! Configuration management for the Stockcast server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with STOCKCAST_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::ProductId;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Demand forecasting configuration
    pub forecast: ForecastConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Products to forecast; every catalog product when unset
    #[serde(default)]
    pub product_ids: Option<Vec<ProductId>>,

    /// JSON coefficient file of the demand model; the rolling-average
    /// baseline is used when unset
    #[serde(default)]
    pub model_path: Option<String>,

    /// Products forecasted concurrently
    pub max_parallel_products: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKCAST_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("forecast.max_parallel_products", 4)?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKCAST_ prefix)
            .add_source(
                Environment::with_prefix("STOCKCAST")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("forecast.product_ids")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ForecastConfig {
    /// Parallelism actually used, at least one
    pub fn parallelism(&self) -> usize {
        self.max_parallel_products.max(1)
    }
}
