//! Configuration management for the Cafe Inventory Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CAFE_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::UnitDefinition;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Identity provider token verification
    pub auth: AuthConfig,

    /// Callable cloud functions (forecasting, anomaly detection)
    pub functions: FunctionsConfig,

    /// Report defaults
    pub reporting: ReportingConfig,

    /// Extra pack-size units added to the standard table
    #[serde(default)]
    pub units: UnitsConfig,
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
pub struct AuthConfig {
    /// Shared secret used to verify tokens from the identity provider
    pub jwt_secret: String,

    /// Expected `iss` claim, if the provider sets one
    pub issuer: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FunctionsConfig {
    /// Base URL of the callable functions
    pub endpoint: String,

    /// API key sent with each call
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportingConfig {
    /// Length of the consumption ranking
    pub default_top_n: usize,

    /// Window length when a report request gives no dates
    pub default_window_days: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UnitsConfig {
    pub packs: Vec<UnitDefinition>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CAFE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("functions.endpoint", "http://localhost:5001")?
            .set_default("functions.api_key", "")?
            .set_default("functions.timeout_secs", 30)?
            .set_default("reporting.default_top_n", shared::reporting::DEFAULT_TOP_N as i64)?
            .set_default("reporting.default_window_days", 7)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CAFE_ prefix)
            .add_source(
                Environment::with_prefix("CAFE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
