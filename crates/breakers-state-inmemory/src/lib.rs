//! In-memory stores for reconciled circuit-breaker storage
//!
//! This crate provides in-memory implementations of the storage contracts
//! defined in breakers-core. The local strategy is the usual delegate of a
//! reconciling strategy; the remote store is useful for development, testing
//! and single-process deployments.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod local;
pub use local::InMemoryStorageStrategy;

pub mod remote;
pub use remote::InMemoryRemoteStore;
