//! Conversion between remote string values and typed breaker fields
//!
//! Decoding is strict for integers and the status label: an absent or
//! unparsable value is a [`CoreError::DecodeError`]. The last-failure
//! timestamp is the exception. Anything that does not parse as epoch
//! milliseconds means "no failure recorded" and is not an error.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::CoreError;
use crate::keys::{KeySpace, RemoteKey};
use crate::types::{CircuitBreakerConfiguration, CircuitBreakerState, CircuitBreakerStatus};

/// Decode a base-10 integer
pub fn decode_integer<T>(raw: Option<&str>) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = raw.ok_or_else(|| CoreError::DecodeError("missing integer value".to_string()))?;
    raw.parse::<T>()
        .map_err(|e| CoreError::DecodeError(format!("invalid integer {:?}: {}", raw, e)))
}

/// Decode one of the canonical status labels
pub fn decode_status(raw: Option<&str>) -> Result<CircuitBreakerStatus, CoreError> {
    match raw {
        Some(label) => label.parse(),
        None => Err(CoreError::DecodeError("missing status value".to_string())),
    }
}

/// Decode an optional epoch-millisecond timestamp
pub fn decode_optional_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let millis = raw?.parse::<i64>().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

/// Encode an integer as its decimal string
pub fn encode_integer<T: Display>(value: T) -> String {
    value.to_string()
}

/// Encode a status as its canonical label
pub fn encode_status(status: CircuitBreakerStatus) -> String {
    status.as_str().to_string()
}

/// Encode an optional timestamp; absent becomes the empty string
pub fn encode_optional_timestamp(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.timestamp_millis().to_string())
        .unwrap_or_default()
}

fn field<'a>(values: &'a [Option<String>], index: usize) -> Option<&'a str> {
    values.get(index).and_then(|v| v.as_deref())
}

/// Decode a configuration from values ordered as [`KeySpace::configuration_keys`]
pub fn decode_configuration(values: &[Option<String>]) -> Result<CircuitBreakerConfiguration, CoreError> {
    let configuration = CircuitBreakerConfiguration {
        failure_threshold: decode_integer(field(values, 0))?,
        recovery_timeout_ms: decode_integer(field(values, 1))?,
    };
    configuration
        .validate()
        .map_err(|e| CoreError::DecodeError(e.to_string()))?;
    Ok(configuration)
}

/// Decode a state from values ordered as [`KeySpace::state_keys`]
pub fn decode_state(values: &[Option<String>]) -> Result<CircuitBreakerState, CoreError> {
    Ok(CircuitBreakerState {
        status: decode_status(field(values, 0))?,
        consecutive_failures: decode_integer(field(values, 1))?,
        last_detected_failure: decode_optional_timestamp(field(values, 2)),
    })
}

/// Key/value pairs to write for a configuration
pub fn encode_configuration(
    keys: &KeySpace,
    configuration: &CircuitBreakerConfiguration,
) -> Vec<(String, String)> {
    vec![
        (
            keys.key(RemoteKey::FailureThreshold),
            encode_integer(configuration.failure_threshold),
        ),
        (
            keys.key(RemoteKey::RecoveryTimeout),
            encode_integer(configuration.recovery_timeout_ms),
        ),
    ]
}

/// Key/value pairs to write for a state
pub fn encode_state(keys: &KeySpace, state: &CircuitBreakerState) -> Vec<(String, String)> {
    vec![
        (keys.key(RemoteKey::Status), encode_status(state.status)),
        (
            keys.key(RemoteKey::FailureCount),
            encode_integer(state.consecutive_failures),
        ),
        (
            keys.key(RemoteKey::LastFailure),
            encode_optional_timestamp(state.last_detected_failure.as_ref()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equality::{configurations_equal, states_equal};

    fn values(pairs: Vec<(String, String)>) -> Vec<Option<String>> {
        pairs.into_iter().map(|(_, v)| Some(v)).collect()
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(decode_integer::<u32>(Some("12")).unwrap(), 12);
        assert!(decode_integer::<u32>(None).unwrap_err().is_decode());
        assert!(decode_integer::<u32>(Some("")).unwrap_err().is_decode());
        assert!(decode_integer::<u32>(Some("abc")).unwrap_err().is_decode());
        assert!(decode_integer::<u32>(Some("-1")).unwrap_err().is_decode());
        assert!(decode_integer::<u64>(Some("1.5")).unwrap_err().is_decode());
    }

    #[test]
    fn test_decode_status() {
        assert_eq!(decode_status(Some("OPEN")).unwrap(), CircuitBreakerStatus::Open);
        assert_eq!(decode_status(Some("CLOSED")).unwrap(), CircuitBreakerStatus::Closed);
        assert_eq!(decode_status(Some("HALF_OPEN")).unwrap(), CircuitBreakerStatus::HalfOpen);
        assert!(decode_status(Some("BROKEN")).unwrap_err().is_decode());
        assert!(decode_status(None).unwrap_err().is_decode());
    }

    #[test]
    fn test_decode_optional_timestamp_never_fails() {
        assert!(decode_optional_timestamp(None).is_none());
        assert!(decode_optional_timestamp(Some("")).is_none());
        assert!(decode_optional_timestamp(Some("yesterday")).is_none());
        // no integer-prefix parsing
        assert!(decode_optional_timestamp(Some("1700000000123.5")).is_none());

        let ts = decode_optional_timestamp(Some("1700000000123")).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_encode_optional_timestamp() {
        assert_eq!(encode_optional_timestamp(None), "");
        let ts = Utc.timestamp_millis_opt(42).single().unwrap();
        assert_eq!(encode_optional_timestamp(Some(&ts)), "42");
    }

    #[test]
    fn test_configuration_round_trip() {
        let keys = KeySpace::new("cb");
        let configuration = CircuitBreakerConfiguration::new(12, 5000).unwrap();
        let encoded = encode_configuration(&keys, &configuration);

        assert_eq!(encoded[0], ("cb.failure.threshold".to_string(), "12".to_string()));
        assert_eq!(encoded[1], ("cb.recovery.timeout".to_string(), "5000".to_string()));

        let decoded = decode_configuration(&values(encoded)).unwrap();
        assert!(configurations_equal(&configuration, &decoded));
    }

    #[test]
    fn test_state_round_trip_at_millisecond_granularity() {
        let keys = KeySpace::new("cb");
        let state = CircuitBreakerState {
            status: CircuitBreakerStatus::Open,
            consecutive_failures: 12,
            last_detected_failure: Some(Utc::now()),
        };

        let decoded = decode_state(&values(encode_state(&keys, &state))).unwrap();
        assert!(states_equal(&state, &decoded));
    }

    #[test]
    fn test_missing_configuration_field_is_decode_error() {
        let err = decode_configuration(&[Some("5".to_string()), None]).unwrap_err();
        assert!(err.is_decode());

        let err = decode_configuration(&[]).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_zero_threshold_is_decode_error() {
        let err = decode_configuration(&[Some("0".to_string()), Some("2000".to_string())]).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_state_with_empty_last_failure() {
        let decoded = decode_state(&[
            Some("CLOSED".to_string()),
            Some("0".to_string()),
            Some(String::new()),
        ])
        .unwrap();
        assert_eq!(decoded, CircuitBreakerState::closed());
    }
}
