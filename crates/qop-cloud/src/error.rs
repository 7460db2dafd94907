//! Error types for the qop-cloud client.

use thiserror::Error;

/// Result type for qop-cloud operations.
pub type QopResult<T> = Result<T, QopError>;

/// Errors that can occur when provisioning cloud simulators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QopError {
    /// Invalid cluster topology (bad slot, duplicate slot, extra controller).
    #[error("Invalid cluster configuration: {0}")]
    Configuration(String),

    /// Login rejected by the platform.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An authenticated call was attempted before a successful login.
    #[error("api client is unauthenticated")]
    Unauthenticated,

    /// Create/delete simulator rejected by the platform.
    #[error("Provisioning failed (HTTP {status}): {message}")]
    Provisioning { status: u16, message: String },

    /// Invalid request on the client side (unsupported version/topology
    /// combination, deprecated-accessor misuse).
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = QopError::Configuration("slot 9 out of range".into());
        assert!(err.to_string().contains("slot 9 out of range"));
    }

    #[test]
    fn test_authentication_failed_display() {
        let err = QopError::AuthenticationFailed("invalid credentials".into());
        assert!(err.to_string().contains("invalid credentials"));
    }

    #[test]
    fn test_unauthenticated_display() {
        let err = QopError::Unauthenticated;
        assert_eq!(err.to_string(), "api client is unauthenticated");
    }

    #[test]
    fn test_provisioning_display() {
        let err = QopError::Provisioning {
            status: 503,
            message: "no capacity".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("no capacity"));
    }

    #[test]
    fn test_validation_display() {
        let err = QopError::Validation("cluster configuration requires v3".into());
        assert!(err.to_string().contains("requires v3"));
    }
}
