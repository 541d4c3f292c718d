//! Configuration for the Redis remote store

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Redis connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis URL, e.g. `redis://127.0.0.1:6379`
    #[serde(default = "default_url")]
    pub url: String,

    /// Timeout for establishing the connection in milliseconds
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
}

fn default_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_connection_timeout_ms() -> u64 {
    3000
}

impl RedisStoreConfig {
    /// Settings for the given URL with default timeouts
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Load settings from `REDIS_URL` and `REDIS_CONNECTION_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("REDIS_URL") {
            config.url = url;
        }

        if let Ok(timeout) = env::var("REDIS_CONNECTION_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => config.connection_timeout_ms = ms,
                Err(_) => warn!("Invalid REDIS_CONNECTION_TIMEOUT_MS value: {}", timeout),
            }
        }

        config
    }
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connection_timeout_ms: default_connection_timeout_ms(),
        }
    }
}
