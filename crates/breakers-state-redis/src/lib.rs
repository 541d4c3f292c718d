//! Redis remote store for reconciled circuit-breaker storage
//!
//! Every breaker field lives under its own `"<id>.<suffix>"` key, so the
//! record can be inspected and edited with plain `GET`/`SET` from any client.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub use config::RedisStoreConfig;

pub mod store;
pub use store::RedisRemoteStore;
