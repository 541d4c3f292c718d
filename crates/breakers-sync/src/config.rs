//! Configuration for a reconciling strategy
//!
//! This module contains the configuration type and its environment loading.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use breakers_core::CoreError;

/// Settings for one reconciled breaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Breaker id; namespaces every remote key
    #[serde(default = "default_breaker_id")]
    pub breaker_id: String,

    /// URL of the remote store (`memory://...` or `redis://...`)
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Period of the background refresh in milliseconds; `None` disables it
    #[serde(default)]
    pub refresh_interval_ms: Option<u64>,
}

fn default_breaker_id() -> String {
    "default".to_string()
}

fn default_remote_url() -> String {
    "memory://local".to_string()
}

impl SyncConfig {
    /// Load configuration from the environment on top of the defaults
    ///
    /// Reads `BREAKER_ID`, `BREAKER_REMOTE_URL` and
    /// `BREAKER_REFRESH_INTERVAL_MS` (`0` or `none` disables the refresh).
    pub fn load() -> Result<Self, CoreError> {
        let mut config = Self::default();

        if let Ok(breaker_id) = env::var("BREAKER_ID") {
            config.breaker_id = breaker_id;
        }

        if let Ok(remote_url) = env::var("BREAKER_REMOTE_URL") {
            config.remote_url = remote_url;
        }

        if let Ok(interval) = env::var("BREAKER_REFRESH_INTERVAL_MS") {
            if interval.eq_ignore_ascii_case("none") {
                config.refresh_interval_ms = None;
            } else if let Ok(ms) = interval.parse::<u64>() {
                config.refresh_interval_ms = Some(ms);
            } else {
                warn!("Invalid BREAKER_REFRESH_INTERVAL_MS value: {}", interval);
            }
        }

        config.validate()?;
        info!("Loaded sync configuration for breaker {}", config.breaker_id);
        Ok(config)
    }

    /// Check that the configuration can be used to build a strategy
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.breaker_id.trim().is_empty() {
            return Err(CoreError::ConfigurationError("Breaker id is required".to_string()));
        }
        if self.remote_url.is_empty() {
            return Err(CoreError::ConfigurationError("Remote store URL is required".to_string()));
        }
        Ok(())
    }

    /// Refresh period, if a non-zero one is configured
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            breaker_id: default_breaker_id(),
            remote_url: default_remote_url(),
            refresh_interval_ms: None,
        }
    }
}
