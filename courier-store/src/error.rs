//! Store error types.

use courier_core::{CoreError, DeliveryStatus};
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Delivery log entry not found.
    #[error("Delivery log entry {0} not found")]
    EntryNotFound(i64),

    /// A terminal delivery log entry was asked to transition again.
    #[error("Delivery log entry {id} is already {current}; cannot mark it {requested}")]
    InvalidTransition {
        /// Entry id.
        id: i64,
        /// Status on disk.
        current: DeliveryStatus,
        /// Status requested.
        requested: DeliveryStatus,
    },

    /// An outcome was recorded without a matching reservation.
    #[error("No reserved attempt for {provider} on {day}")]
    NoReservation {
        /// Provider name.
        provider: String,
        /// Calendar day.
        day: String,
    },

    /// Schema on disk is newer than this build understands.
    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew {
        /// Version on disk.
        found: i32,
        /// Version this build writes.
        supported: i32,
    },

    /// A stored value failed to parse.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Blocking task failed.
    #[error("Database task failed: {0}")]
    Task(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            StoreError::Io(_) | StoreError::Task(_) => true,
            _ => false,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Config(msg) => CoreError::InvalidConfig(msg),
            StoreError::Corrupt(msg) => CoreError::InvalidData(msg),
            StoreError::Serialization(e) => CoreError::Serialization(e),
            other => CoreError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error() {
        let err: CoreError = StoreError::EntryNotFound(3).into();
        assert!(matches!(err, CoreError::Storage(ref m) if m.contains("3 not found")));

        let err: CoreError = StoreError::Config("quota is zero".into()).into();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_transition_message() {
        let err = StoreError::InvalidTransition {
            id: 9,
            current: DeliveryStatus::Sent,
            requested: DeliveryStatus::Failed,
        };
        assert_eq!(
            err.to_string(),
            "Delivery log entry 9 is already sent; cannot mark it failed"
        );
    }
}
