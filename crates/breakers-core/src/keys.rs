//! Remote key schema for one breaker
//!
//! Every key of a breaker is `"<id>.<suffix>"`. The remote store has no notion
//! of grouping, so the five keys are read and written independently.

use std::fmt;

/// A single field of the remote record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    /// Breaker status label
    Status,
    /// Configuration: recovery timeout in milliseconds
    RecoveryTimeout,
    /// Configuration: failure threshold
    FailureThreshold,
    /// State: consecutive failure count
    FailureCount,
    /// State: epoch milliseconds of the last failure, or empty
    LastFailure,
}

impl RemoteKey {
    /// Key suffix appended after the breaker id
    pub fn suffix(&self) -> &'static str {
        match self {
            RemoteKey::Status => "status",
            RemoteKey::RecoveryTimeout => "recovery.timeout",
            RemoteKey::FailureThreshold => "failure.threshold",
            RemoteKey::FailureCount => "failure.count",
            RemoteKey::LastFailure => "failure.last",
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Keys of the configuration object, in decode order
pub const CONFIGURATION_KEYS: [RemoteKey; 2] = [RemoteKey::FailureThreshold, RemoteKey::RecoveryTimeout];

/// Keys of the state object, in decode order
pub const STATE_KEYS: [RemoteKey; 3] = [RemoteKey::Status, RemoteKey::FailureCount, RemoteKey::LastFailure];

/// Namespace of remote keys for one breaker id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    id: String,
}

impl KeySpace {
    /// Create the key space for a breaker id
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The breaker id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fully qualified remote key
    pub fn key(&self, key: RemoteKey) -> String {
        format!("{}.{}", self.id, key.suffix())
    }

    /// Remote keys of the configuration object
    pub fn configuration_keys(&self) -> Vec<String> {
        CONFIGURATION_KEYS.iter().map(|k| self.key(*k)).collect()
    }

    /// Remote keys of the state object
    pub fn state_keys(&self) -> Vec<String> {
        STATE_KEYS.iter().map(|k| self.key(*k)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed_with_id() {
        let keys = KeySpace::new("payments");
        assert_eq!(keys.key(RemoteKey::Status), "payments.status");
        assert_eq!(keys.key(RemoteKey::RecoveryTimeout), "payments.recovery.timeout");
        assert_eq!(keys.key(RemoteKey::FailureThreshold), "payments.failure.threshold");
        assert_eq!(keys.key(RemoteKey::FailureCount), "payments.failure.count");
        assert_eq!(keys.key(RemoteKey::LastFailure), "payments.failure.last");
    }

    #[test]
    fn test_key_groups() {
        let keys = KeySpace::new("a");
        assert_eq!(keys.configuration_keys(), vec!["a.failure.threshold", "a.recovery.timeout"]);
        assert_eq!(keys.state_keys(), vec!["a.status", "a.failure.count", "a.failure.last"]);
    }
}
