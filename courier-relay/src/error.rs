//! Relay error types.

use std::time::Duration;

use courier_core::{CoreError, ValidationError};
use thiserror::Error;

// ============================================================================
// Transport Error
// ============================================================================

/// One provider's delivery attempt failed.
///
/// Always recovered by failover to the next provider.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The call did not finish within the relay timeout.
    #[error("Relay call timed out after {0:?}")]
    Timeout(Duration),

    /// The relay answered with a non-success status.
    #[error("Rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The relay refused our credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The relay accepted the request but the response made no sense.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credentials are missing for this provider.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[source] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}

// ============================================================================
// Relay Error
// ============================================================================

/// Error surfaced to administrative callers of replay and purge.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request was rejected before anything was mutated.
    #[error(transparent)]
    Validation(ValidationError),

    /// A storage or collaborator failure.
    #[error(transparent)]
    Core(CoreError),
}

impl RelayError {
    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            Self::Core(_) => None,
        }
    }
}

impl From<ValidationError> for RelayError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<CoreError> for RelayError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => Self::Validation(v),
            other => Self::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_validation_is_lifted() {
        let err: RelayError = CoreError::from(ValidationError::LogEntryNotFound(7)).into();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::LogEntryNotFound(7))
        );
    }

    #[test]
    fn test_storage_error_stays_core() {
        let err: RelayError = CoreError::Storage("disk full".into()).into();
        assert!(err.as_validation().is_none());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Rejected {
            status: 400,
            body: "bad sender".into(),
        };
        assert_eq!(err.to_string(), "Rejected with status 400: bad sender");
    }
}
