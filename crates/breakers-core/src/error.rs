use thiserror::Error;

/// Core error type for reconciled breaker storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A remote record is absent or one of its fields cannot be parsed
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The remote store is unreachable or a call to it failed
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Invalid construction or configuration input
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Whether this error means the remote data is missing or malformed
    pub fn is_decode(&self) -> bool {
        matches!(self, CoreError::DecodeError(_))
    }

    /// Whether this error came from the remote store itself
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::TransportError(_))
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (CoreError::DecodeError("missing key".to_string()), "Decode error: missing key"),
            (CoreError::TransportError("refused".to_string()), "Transport error: refused"),
            (CoreError::ConfigurationError("bad url".to_string()), "Configuration error: bad url"),
            (CoreError::Other("other_err".to_string()), "other_err"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_classification() {
        assert!(CoreError::DecodeError("x".into()).is_decode());
        assert!(!CoreError::DecodeError("x".into()).is_transport());
        assert!(CoreError::TransportError("x".into()).is_transport());
        assert!(!CoreError::ConfigurationError("x".into()).is_decode());
    }

    #[test]
    fn test_from_str() {
        let error: CoreError = "test error message".into();

        match error {
            CoreError::Other(msg) => {
                assert_eq!(msg, "test error message");
            }
            _ => panic!("Expected Other variant"),
        }
    }

    #[test]
    fn test_error_clone_and_eq() {
        let original = CoreError::TransportError("test".to_string());
        let cloned = original.clone();

        assert_eq!(original, cloned);
        assert_eq!(format!("{:?}", original), format!("{:?}", cloned));
    }
}
