//!
//! Breakers Core - shared model for reconciled circuit-breaker storage
//!
//! This crate defines the persisted configuration and state of a circuit
//! breaker, the string codec used for the remote key-value record, the
//! equality rules used to detect divergence, and the storage contracts the
//! other crates implement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Error types
pub mod error;

/// Configuration, state and status value objects
pub mod types;

/// Remote key schema
pub mod keys;

/// String codec for remote values
pub mod codec;

/// Equality oracle
pub mod equality;

/// Local and remote storage contracts
pub mod storage;

pub use equality::{configurations_equal, states_equal};
pub use error::CoreError;
pub use keys::{KeySpace, RemoteKey};
pub use storage::{RemoteStore, StorageStrategy};
pub use types::{CircuitBreakerConfiguration, CircuitBreakerState, CircuitBreakerStatus};
