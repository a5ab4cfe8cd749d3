//! # Change Queue
//!
//! Durable, ordered log of mutations made while offline. Entries are stored in
//! the `pending_changes` table of the local store and read back in ascending
//! creation time, which is the order the sync engine replays them in.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rentsync::local_db::MemoryStorage;
//! use rentsync::offline::ChangeQueue;
//! use rentsync::shared::{ChangeOperation, EntityType, NewChange};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> rentsync::shared::error::Result<()> {
//! let queue = ChangeQueue::new(Arc::new(MemoryStorage::new()));
//!
//! queue
//!     .queue_change(NewChange::now(EntityType::Room, "r1", ChangeOperation::Delete, json!({ "id": "r1" })))
//!     .await?;
//!
//! for change in queue.get_pending_changes().await? {
//!     // Replay change...
//!     queue.remove_change(&change.id).await?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::local_db::{Filter, Storage, Table};
use crate::shared::change::{NewChange, PendingChange};
use crate::shared::entities::EntityType;
use crate::shared::error::{Result, SyncCoreError};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Queue of pending changes
#[derive(Debug)]
pub struct ChangeQueue {
    storage: Arc<dyn Storage>,
    /// Serializes id assignment
    enqueue_lock: Mutex<()>,
}

impl ChangeQueue {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            enqueue_lock: Mutex::new(()),
        }
    }

    /// Persist a new change with `retry_count = 0`
    ///
    /// If the same entity already has a change stamped with the same
    /// millisecond, the id gets a `_{n}` suffix; the timestamp is kept as is.
    pub async fn queue_change(&self, change: NewChange) -> Result<()> {
        let _guard = self.enqueue_lock.lock().await;

        let base = PendingChange::make_id(change.entity_type, &change.entity_id, change.timestamp);
        let mut id = base.clone();
        let mut seq = 0u32;
        while self.storage.get(Table::PendingChanges, &id).await?.is_some() {
            seq += 1;
            id = format!("{}_{}", base, seq);
        }

        let pending = PendingChange {
            id,
            entity_type: change.entity_type,
            entity_id: change.entity_id,
            operation: change.operation,
            data: change.data,
            timestamp: change.timestamp,
            retry_count: 0,
        };

        self.write(&pending).await?;
        tracing::debug!(
            "Queued {} {} {} as {}",
            pending.operation.as_str(),
            pending.entity_type,
            pending.entity_id,
            pending.id
        );

        Ok(())
    }

    /// All queued changes in ascending timestamp order; ties keep enqueue order
    pub async fn get_pending_changes(&self) -> Result<Vec<PendingChange>> {
        let records = self.storage.get_all(Table::PendingChanges, None).await?;

        let mut changes = Vec::with_capacity(records.len());
        for record in records {
            changes.push(Self::decode(record)?);
        }
        changes.sort_by_key(|change| change.timestamp);

        Ok(changes)
    }

    /// Number of queued changes
    pub async fn get_pending_changes_count(&self) -> Result<usize> {
        self.storage.count(Table::PendingChanges).await
    }

    /// Get one queued change
    pub async fn get_change(&self, id: &str) -> Result<Option<PendingChange>> {
        match self.storage.get(Table::PendingChanges, id).await? {
            Some(record) => Ok(Some(Self::decode(record)?)),
            None => Ok(None),
        }
    }

    /// Whether any queued change targets the given entity
    pub async fn has_pending_for(&self, entity_type: EntityType, entity_id: &str) -> Result<bool> {
        let records = self
            .storage
            .get_all(Table::PendingChanges, Some(Filter::eq("entityId", entity_id)))
            .await?;
        Ok(records
            .iter()
            .any(|r| r.get("entityType").and_then(Value::as_str) == Some(entity_type.as_str())))
    }

    /// Remove a change; removing an unknown id is a no-op
    pub async fn remove_change(&self, id: &str) -> Result<()> {
        if self.storage.delete(Table::PendingChanges, id).await? {
            tracing::debug!("Removed pending change {}", id);
        }
        Ok(())
    }

    /// Record one more failed attempt; unknown ids are ignored
    ///
    /// The whole record is replaced with its successor value, never patched
    /// in place.
    pub async fn increment_retry_count(&self, id: &str) -> Result<()> {
        let Some(change) = self.get_change(id).await? else {
            return Ok(());
        };

        self.write(&change.with_incremented_retry()).await
    }

    async fn write(&self, change: &PendingChange) -> Result<()> {
        let record = serde_json::to_value(change)?;
        self.storage.put(Table::PendingChanges, &change.id, &record).await
    }

    fn decode(record: Value) -> Result<PendingChange> {
        let key = record
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        serde_json::from_value(record)
            .map_err(|e| SyncCoreError::corrupt(Table::PendingChanges.name(), key, e.to_string()))
    }
}
