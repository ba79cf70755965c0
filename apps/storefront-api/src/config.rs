//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Secret used when `JWT_SECRET` is unset. Only fit for local development.
pub const DEV_JWT_SECRET: &str = "storefront-dev-secret-change-in-production";

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// Interface to bind
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub jwt_expiry_secs: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: 5001,
            bind_addr: "0.0.0.0".to_string(),
            database_path: "storefront.db".to_string(),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiry_secs: 86_400, // 24 hours
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            port: parse_or(&lookup, "PORT", defaults.port)?,

            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),

            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }),

            jwt_expiry_secs: parse_or(&lookup, "JWT_EXPIRY_SECS", defaults.jwt_expiry_secs)?,
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }

        if config.jwt_expiry_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_EXPIRY_SECS".to_string()));
        }

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// `host:port` for the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.database_path, "storefront.db");
        assert_eq!(config.jwt_expiry_secs, 86_400);
        assert_eq!(config.bind_address(), "0.0.0.0:5001");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1"),
            ("DATABASE_PATH", "/tmp/shop.db"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRY_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.database_path, "/tmp/shop.db");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.jwt_expiry_secs, 60);
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT");

        assert!(config_from(&[("JWT_EXPIRY_SECS", "0")]).is_err());
        assert!(config_from(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "")]).is_err());
    }
}
