//! Shared Error Types
//!
//! Error types for the local side of the sync core (storage, queue, config)
//! and for replaying changes against the remote service.
//!
//! # Error Categories
//!
//! - `SyncCoreError` - local failures; always propagated to the caller
//! - `RemoteError` - replay failures; retried by the sync engine, never thrown
//!   out of a drain
//!
//! # Usage
//!
//! ```rust
//! use rentsync::shared::error::SyncCoreError;
//!
//! let error = SyncCoreError::invalid_filter("Property");
//! assert!(error.to_string().contains("Property"));
//! ```
use thiserror::Error;

use crate::shared::config::ConfigError;

/// Result type for local sync core operations
pub type Result<T> = std::result::Result<T, SyncCoreError>;

/// Failures of local storage and bookkeeping.
///
/// These are fatal to the operation that requested them and are never retried
/// internally.
#[derive(Debug, Error)]
pub enum SyncCoreError {
    /// The embedded database rejected a statement
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while preparing the database location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A foreign-key filter was requested on an entity type without one
    #[error("Entity type '{entity_type}' cannot be filtered by a foreign key")]
    InvalidFilter {
        /// The entity type that was queried
        entity_type: String,
    },

    /// A stored record is structurally broken
    #[error("Corrupt record '{key}' in table '{table}': {message}")]
    CorruptRecord {
        /// Table holding the record
        table: String,
        /// Record key
        key: String,
        /// Human-readable error message
        message: String,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SyncCoreError {
    /// Create a new invalid filter error
    pub fn invalid_filter(entity_type: impl Into<String>) -> Self {
        Self::InvalidFilter {
            entity_type: entity_type.into(),
        }
    }

    /// Create a new corrupt record error
    pub fn corrupt(
        table: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CorruptRecord {
            table: table.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Failure of a single remote call.
///
/// The sync engine treats every variant the same way: retry until the budget
/// runs out, then drop the change.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure, including client-side timeouts
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Remote returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// The queued payload could not be decoded into the entity type
    #[error("Payload decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The remote refused the change for a domain reason
    #[error("Rejected: {message}")]
    Rejected {
        /// Human-readable error message
        message: String,
    },

    /// The configured base URL cannot address an endpoint
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Create a new rejection error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_error() {
        let error = SyncCoreError::invalid_filter("Property");
        match error {
            SyncCoreError::InvalidFilter { entity_type } => {
                assert_eq!(entity_type, "Property");
            }
            _ => panic!("Expected InvalidFilter"),
        }
    }

    #[test]
    fn test_corrupt_record_display() {
        let error = SyncCoreError::corrupt("rooms", "r1", "missing id");
        let display = format!("{}", error);
        assert!(display.contains("rooms"));
        assert!(display.contains("r1"));
        assert!(display.contains("missing id"));
    }

    #[test]
    fn test_from_serde_error() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let error: SyncCoreError = result.unwrap_err().into();
        assert!(matches!(error, SyncCoreError::Serialization(_)));
    }

    #[test]
    fn test_remote_status_display() {
        let error = RemoteError::Status {
            status: 409,
            body: "duplicate room number".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("409"));
        assert!(display.contains("duplicate room number"));
    }

    #[test]
    fn test_rejected_error() {
        let error = RemoteError::rejected("validation failed");
        assert_eq!(error.to_string(), "Rejected: validation failed");
    }
}
