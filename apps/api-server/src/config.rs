//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use quire_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("MONGODB_URI").ok().map(|uri| DatabaseConfig {
            uri,
            database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "quire".to_string()),
            collection: env::var("MONGODB_COLLECTION").unwrap_or_else(|_| "posts".to_string()),
            max_pool_size: parse_var("MONGODB_MAX_POOL_SIZE").unwrap_or(100),
            min_pool_size: parse_var("MONGODB_MIN_POOL_SIZE").unwrap_or(10),
            connect_timeout: Duration::from_secs(parse_var("MONGODB_CONNECT_TIMEOUT_SECS").unwrap_or(10)),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
