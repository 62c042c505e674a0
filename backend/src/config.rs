//! Configuration management for the spare-parts inventory server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SIMS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::ledger::LedgerPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    pub ledger: LedgerConfig,

    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,

    pub host: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
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
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Token lifetime in seconds
    pub token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Let a stock-out revision drive a spare part below zero
    pub allow_negative_stock_on_revise: bool,

    /// How long a ledger transaction waits for a row lock
    pub lock_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    pub admin_username: String,

    /// When set, the admin account is created at startup if it is missing
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SIMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.log_json", false)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.token_expiry", 86400)?
            .set_default("ledger.allow_negative_stock_on_revise", true)?
            .set_default("ledger.lock_timeout_ms", 5000)?
            .set_default("bootstrap.admin_username", "admin")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SIMS_ prefix)
            .add_source(
                Environment::with_prefix("SIMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn ledger_policy(&self) -> LedgerPolicy {
        LedgerPolicy::from(&self.ledger)
    }
}

impl From<&LedgerConfig> for LedgerPolicy {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            allow_negative_stock_on_revise: config.allow_negative_stock_on_revise,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
            log_json: false,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            allow_negative_stock_on_revise: true,
            lock_timeout_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_policy_follows_config() {
        let strict = LedgerConfig {
            allow_negative_stock_on_revise: false,
            ..LedgerConfig::default()
        };
        assert!(!LedgerPolicy::from(&strict).allow_negative_stock_on_revise);
        assert_eq!(
            LedgerPolicy::from(&LedgerConfig::default()),
            LedgerPolicy::default()
        );
    }
}
