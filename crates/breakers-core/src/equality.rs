//! Structural equality used to decide whether a remote value must be propagated

use crate::types::{CircuitBreakerConfiguration, CircuitBreakerState};

/// Whether two configurations carry the same threshold and timeout
pub fn configurations_equal(a: &CircuitBreakerConfiguration, b: &CircuitBreakerConfiguration) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    a.failure_threshold == b.failure_threshold && a.recovery_timeout_ms == b.recovery_timeout_ms
}

/// Whether two states are equal, comparing failure timestamps in milliseconds
pub fn states_equal(a: &CircuitBreakerState, b: &CircuitBreakerState) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    if a.status != b.status || a.consecutive_failures != b.consecutive_failures {
        return false;
    }
    a.last_detected_failure.map(|ts| ts.timestamp_millis())
        == b.last_detected_failure.map(|ts| ts.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CircuitBreakerStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn open_state(failures: u32) -> CircuitBreakerState {
        CircuitBreakerState {
            status: CircuitBreakerStatus::Open,
            consecutive_failures: failures,
            last_detected_failure: Utc.timestamp_millis_opt(1_700_000_000_000).single(),
        }
    }

    #[test]
    fn test_configurations_equal() {
        let a = CircuitBreakerConfiguration::new(5, 2000).unwrap();
        assert!(configurations_equal(&a, &a));
        assert!(configurations_equal(&a, &a.clone()));
        assert!(!configurations_equal(&a, &CircuitBreakerConfiguration::new(6, 2000).unwrap()));
        assert!(!configurations_equal(&a, &CircuitBreakerConfiguration::new(5, 2001).unwrap()));
    }

    #[test]
    fn test_states_equal_fields() {
        let a = open_state(3);
        assert!(states_equal(&a, &a));
        assert!(states_equal(&a, &open_state(3)));
        assert!(!states_equal(&a, &open_state(4)));

        let mut half_open = open_state(3);
        half_open.status = CircuitBreakerStatus::HalfOpen;
        assert!(!states_equal(&a, &half_open));
    }

    #[test]
    fn test_states_equal_timestamps() {
        let a = open_state(3);

        let mut no_failure = a.clone();
        no_failure.last_detected_failure = None;
        assert!(!states_equal(&a, &no_failure));
        assert!(states_equal(&no_failure, &no_failure.clone()));

        // sub-millisecond differences are invisible to the remote store
        let mut finer = a.clone();
        finer.last_detected_failure = a.last_detected_failure.map(|ts| ts + Duration::microseconds(400));
        assert!(states_equal(&a, &finer));

        let mut later = a.clone();
        later.last_detected_failure = a.last_detected_failure.map(|ts| ts + Duration::milliseconds(1));
        assert!(!states_equal(&a, &later));
    }
}
