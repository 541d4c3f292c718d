//! Reconciled circuit-breaker storage
//!
//! [`ReconcilingStorageStrategy`] answers every read from a local
//! [`StorageStrategy`] and converges it with a shared [`RemoteStore`] in the
//! background, so several processes guarding the same dependency end up
//! with the same breaker configuration and state.
//!
//! ```no_run
//! use std::sync::Arc;
//! use breakers_core::StorageStrategy;
//! use breakers_state_inmemory::InMemoryStorageStrategy;
//! use breakers_sync::{create_remote_store, ReconcilingStorageStrategy, SyncConfig};
//!
//! # async fn run() -> Result<(), breakers_core::CoreError> {
//! let config = SyncConfig::load()?;
//! let remote = create_remote_store(&config.remote_url)?;
//! let strategy = ReconcilingStorageStrategy::from_config(
//!     &config,
//!     remote,
//!     Arc::new(InMemoryStorageStrategy::default()),
//! )?;
//! strategy.on_state_change(|previous, next| {
//!     println!("state moved from {} to {}", previous.status, next.status);
//! });
//! let state = strategy.load_state();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use tracing::{error, info};

use breakers_core::{CoreError, RemoteStore};
use breakers_state_inmemory::InMemoryRemoteStore;

pub mod config;
pub use config::SyncConfig;

pub mod observer;
pub use observer::{ChangeObserver, ObserverSlot, StorageChange};

pub mod strategy;
pub use strategy::{ReconcileOutcome, ReconcilingStorageStrategy};

pub use breakers_core::{
    CircuitBreakerConfiguration, CircuitBreakerState, CircuitBreakerStatus, StorageStrategy,
};

/// Create a remote store from its URL
///
/// `memory://` gives a process-local store. `redis://` and `rediss://`
/// require the `redis` feature.
pub fn create_remote_store(url: &str) -> Result<Arc<dyn RemoteStore>, CoreError> {
    if url.starts_with("memory://") {
        info!("Using in-memory remote store");
        return Ok(Arc::new(InMemoryRemoteStore::new()));
    }

    if url.starts_with("redis://") || url.starts_with("rediss://") {
        return create_redis_store(url);
    }

    error!("Unsupported remote store URL: {}", url);
    Err(CoreError::ConfigurationError(format!(
        "Unsupported remote store URL: {}",
        url
    )))
}

#[cfg(feature = "redis")]
fn create_redis_store(url: &str) -> Result<Arc<dyn RemoteStore>, CoreError> {
    info!("Using Redis remote store");
    let store = breakers_state_redis::RedisRemoteStore::new(url)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
fn create_redis_store(url: &str) -> Result<Arc<dyn RemoteStore>, CoreError> {
    error!("Redis remote store requested but the redis feature is disabled: {}", url);
    Err(CoreError::ConfigurationError(
        "Redis support is not enabled; build with the redis feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_memory_store() {
        assert!(create_remote_store("memory://local").is_ok());
    }

    #[test]
    fn test_unsupported_url() {
        let result = create_remote_store("etcd://localhost:2379");
        assert!(matches!(result, Err(CoreError::ConfigurationError(_))));
    }

    #[cfg(not(feature = "redis"))]
    #[test]
    fn test_redis_requires_feature() {
        let result = create_remote_store("redis://127.0.0.1:6379");
        assert!(matches!(result, Err(CoreError::ConfigurationError(_))));
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_create_redis_store_does_not_connect() {
        assert!(create_remote_store("redis://127.0.0.1:1").is_ok());
    }
}
