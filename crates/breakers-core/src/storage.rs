//! Storage contracts consumed and provided by reconciled storage
//!
//! # Data Flow
//! ```text
//! Circuit breaker
//!     → StorageStrategy::load_* / save_*   (synchronous, never fails)
//!         → local delegate (StorageStrategy)
//!         → remote store (RemoteStore, asynchronous, may fail)
//! ```

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{CircuitBreakerConfiguration, CircuitBreakerState};

/// Storage used by a circuit breaker to persist its configuration and state
///
/// Implementations must always return a value; fault handling is internal.
pub trait StorageStrategy: Send + Sync {
    /// Load the current configuration
    fn load_configuration(&self) -> CircuitBreakerConfiguration;

    /// Replace the configuration
    fn save_configuration(&self, configuration: CircuitBreakerConfiguration);

    /// Load the current state
    fn load_state(&self) -> CircuitBreakerState;

    /// Replace the state
    fn save_state(&self, state: CircuitBreakerState);
}

/// A shared key-value backend with multi-key get and set
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Establish the connection to the backend
    async fn connect(&self) -> Result<(), CoreError>;

    /// Read several keys; absent keys are `None`, in request order
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CoreError>;

    /// Write several key/value pairs
    ///
    /// The pairs are not guaranteed to become visible atomically.
    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), CoreError>;
}
