//! Redis implementation of RemoteStore
//!
//! Uses `MGET`/`MSET` over a single auto-reconnecting connection. The
//! connection is established on the first call to `connect` (or the first
//! command) and shared by every caller.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use tokio::sync::OnceCell;
use tokio::time;
use tracing::{debug, error, info};

use breakers_core::{CoreError, RemoteStore};

use crate::config::RedisStoreConfig;

fn transport_error(context: &str, err: RedisError) -> CoreError {
    error!("{}: {}", context, err);
    CoreError::TransportError(format!("{}: {}", context, err))
}

/// Redis-backed remote store
pub struct RedisRemoteStore {
    client: Client,
    config: RedisStoreConfig,
    connection: OnceCell<ConnectionManager>,
}

impl RedisRemoteStore {
    /// Create a store for a Redis URL with default settings
    pub fn new(redis_url: &str) -> Result<Self, CoreError> {
        Self::with_config(RedisStoreConfig::with_url(redis_url))
    }

    /// Create a store with explicit settings
    ///
    /// No connection is attempted here; see [`RemoteStore::connect`].
    pub fn with_config(config: RedisStoreConfig) -> Result<Self, CoreError> {
        info!("Creating new RedisRemoteStore with URL: {}", config.url);
        let client = Client::open(config.url.as_str())
            .map_err(|e| CoreError::ConfigurationError(format!("Invalid Redis URL {}: {}", config.url, e)))?;

        Ok(Self {
            client,
            config,
            connection: OnceCell::new(),
        })
    }

    /// The settings this store was created with
    pub fn config(&self) -> &RedisStoreConfig {
        &self.config
    }

    async fn connection(&self) -> Result<ConnectionManager, CoreError> {
        let timeout_ms = self.config.connection_timeout_ms;
        let manager = self
            .connection
            .get_or_try_init(|| async {
                match time::timeout(
                    Duration::from_millis(timeout_ms),
                    self.client.get_connection_manager(),
                )
                .await
                {
                    Ok(Ok(manager)) => {
                        info!("Connected to Redis at {}", self.config.url);
                        Ok(manager)
                    }
                    Ok(Err(e)) => Err(transport_error("Unable to connect to Redis", e)),
                    Err(_) => {
                        error!("Timed out connecting to Redis after {}ms", timeout_ms);
                        Err(CoreError::TransportError(format!(
                            "Timed out establishing Redis connection after {}ms",
                            timeout_ms
                        )))
                    }
                }
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl RemoteStore for RedisRemoteStore {
    async fn connect(&self) -> Result<(), CoreError> {
        self.connection().await.map(|_| ())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| transport_error("Redis MGET error", e))?;

        debug!("Raw values loaded from Redis for {:?}: {:?}", keys, values);
        Ok(values)
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), CoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;

        redis::cmd("MSET")
            .arg(entries)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| transport_error("Redis MSET error", e))?;

        debug!("Set {} keys in Redis", entries.len());
        Ok(())
    }
}
