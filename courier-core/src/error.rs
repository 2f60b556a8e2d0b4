//! Core error types for `Courier`.

use thiserror::Error;

use crate::models::DeliveryStatus;

/// Core error type for `Courier` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input rejected before any state was touched.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data read back from storage.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Persistence backend failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Account directory failure.
    #[error("Account lookup failed: {0}")]
    Lookup(String),

    /// Message renderer failure.
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            _ => None,
        }
    }
}

/// Rejected administrative or caller input.
///
/// Returned before any mutation of the quota ledger or delivery log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No delivery log entry with this id.
    #[error("Delivery log entry {0} not found")]
    LogEntryNotFound(i64),

    /// Only failed entries can be replayed.
    #[error("Delivery log entry {id} is {status}; only failed entries can be replayed")]
    NotReplayable {
        /// Entry id.
        id: i64,
        /// Current status of the entry.
        status: DeliveryStatus,
    },

    /// The recipient no longer maps to an account.
    #[error("Recipient no longer resolves to a known account: {0}")]
    UnknownRecipient(String),

    /// A password reset replay found no issued token.
    #[error("No reset token has been issued for {0}")]
    MissingResetToken(String),

    /// Retention horizon outside the configured bounds.
    #[error("Retention horizon of {days} days is outside {min}..={max}")]
    HorizonOutOfRange {
        /// Requested horizon.
        days: u32,
        /// Lowest accepted value.
        min: u32,
        /// Highest accepted value.
        max: u32,
    },

    /// Malformed recipient address.
    #[error("Invalid recipient address: {0:?}")]
    InvalidRecipient(String),

    /// Malformed message type.
    #[error("Invalid message type: {0:?}")]
    InvalidMessageType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts_into_core_error() {
        let err: CoreError = ValidationError::LogEntryNotFound(7).into();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::LogEntryNotFound(7))
        );
        assert_eq!(
            err.to_string(),
            "Validation failed: Delivery log entry 7 not found"
        );
    }

    #[test]
    fn test_not_replayable_message() {
        let err = ValidationError::NotReplayable {
            id: 3,
            status: DeliveryStatus::Sent,
        };
        assert_eq!(
            err.to_string(),
            "Delivery log entry 3 is sent; only failed entries can be replayed"
        );
    }

    #[test]
    fn test_horizon_message() {
        let err = ValidationError::HorizonOutOfRange {
            days: 5,
            min: 7,
            max: 90,
        };
        assert_eq!(err.to_string(), "Retention horizon of 5 days is outside 7..=90");
    }
}
