//! Shared Module
//!
//! Types used across the sync core: the rental entities, the pending change
//! record, configuration and error types.

/// Rental domain entities
pub mod entities;

/// Pending change record
pub mod change;

/// Error types
pub mod error;

/// Sync core configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use change::{ChangeOperation, NewChange, PendingChange};
pub use config::{ConfigError, SyncConfig, SyncConfigBuilder};
pub use entities::{Entity, EntityType, PaymentRecord, Property, Room, SyncStatus, Tenant};
pub use error::{RemoteError, SyncCoreError};
