//! Value objects persisted for a circuit breaker
//!
//! Both the configuration and the state are immutable snapshots. A breaker
//! never patches a single field; it saves a whole new value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Circuit breaker status
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitBreakerStatus {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Circuit is half-open, a probe is allowed through
    HalfOpen,
}

impl CircuitBreakerStatus {
    /// Canonical label used in the remote store
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitBreakerStatus::Closed => "CLOSED",
            CircuitBreakerStatus::Open => "OPEN",
            CircuitBreakerStatus::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for CircuitBreakerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitBreakerStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLOSED" => Ok(CircuitBreakerStatus::Closed),
            "OPEN" => Ok(CircuitBreakerStatus::Open),
            "HALF_OPEN" => Ok(CircuitBreakerStatus::HalfOpen),
            other => Err(CoreError::DecodeError(format!("Unknown breaker status: {:?}", other))),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfiguration {
    /// Number of consecutive failures needed to trip the circuit
    pub failure_threshold: u32,
    /// Time in milliseconds to wait before probing again
    pub recovery_timeout_ms: u64,
}

impl CircuitBreakerConfiguration {
    /// Create a configuration, rejecting zero thresholds and timeouts
    pub fn new(failure_threshold: u32, recovery_timeout_ms: u64) -> Result<Self, CoreError> {
        let configuration = Self {
            failure_threshold,
            recovery_timeout_ms,
        };
        configuration.validate()?;
        Ok(configuration)
    }

    /// Check the `> 0` invariants on both fields
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.failure_threshold == 0 {
            return Err(CoreError::ConfigurationError(
                "failure threshold must be greater than zero".to_string(),
            ));
        }
        if self.recovery_timeout_ms == 0 {
            return Err(CoreError::ConfigurationError(
                "recovery timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CircuitBreakerConfiguration {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_ms: 2000,
        }
    }
}

/// Circuit breaker runtime state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerState {
    /// Current status
    pub status: CircuitBreakerStatus,
    /// Failures observed since the last success
    pub consecutive_failures: u32,
    /// When the most recent failure was detected, if any
    #[serde(default)]
    pub last_detected_failure: Option<DateTime<Utc>>,
}

impl CircuitBreakerState {
    /// A closed breaker with no recorded failures
    pub fn closed() -> Self {
        Self {
            status: CircuitBreakerStatus::Closed,
            consecutive_failures: 0,
            last_detected_failure: None,
        }
    }
}

impl Default for CircuitBreakerState {
    fn default() -> Self {
        Self::closed()
    }
}
