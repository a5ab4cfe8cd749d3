//! Pending Change Record
//!
//! One durable mutation intent recorded while offline (or speculatively while
//! online) and replayed later by the sync engine.
//!
//! The persisted shape is:
//!
//! ```text
//! { "id": "Room_r1_1760486400000", "entityType": "Room", "entityId": "r1",
//!   "operation": "create", "data": { ... }, "timestamp": "...", "retryCount": 0 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::entities::EntityType;

/// The kind of mutation a pending change replays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

impl ChangeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Create => "create",
            ChangeOperation::Update => "update",
            ChangeOperation::Delete => "delete",
        }
    }
}

/// A queued mutation waiting to be replayed against the remote service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    /// `{entityType}_{entityId}_{creationEpochMs}`, plus `_{n}` when two changes
    /// for one entity share a millisecond
    pub id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub operation: ChangeOperation,
    /// Payload snapshot needed to replay the operation
    pub data: Value,
    /// Creation time; drains run in ascending order of this field
    pub timestamp: DateTime<Utc>,
    /// Failed replay attempts so far
    pub retry_count: u32,
}

impl PendingChange {
    /// Build the base queue id for a change
    pub fn make_id(entity_type: EntityType, entity_id: &str, timestamp: DateTime<Utc>) -> String {
        format!("{}_{}_{}", entity_type, entity_id, timestamp.timestamp_millis())
    }

    /// The same change after one more failed attempt
    pub fn with_incremented_retry(&self) -> Self {
        Self {
            retry_count: self.retry_count.saturating_add(1),
            ..self.clone()
        }
    }
}

/// A change as submitted by callers; the queue assigns id and retry count
#[derive(Debug, Clone, PartialEq)]
pub struct NewChange {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub operation: ChangeOperation,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl NewChange {
    /// A change stamped with the current time
    pub fn now(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        operation: ChangeOperation,
        data: Value,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            operation,
            data,
            timestamp: Utc::now(),
        }
    }
}
