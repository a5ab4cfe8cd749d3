//! # Sync Metadata Operations
//!
//! Small key-value facts about synchronization that must survive restarts,
//! such as the time of the last completed drain.

use super::{Storage, Table};
use crate::shared::error::{Result, SyncCoreError};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

const LAST_SYNC_KEY: &str = "last_sync_time";

/// Persistent sync metadata
#[derive(Debug, Clone)]
pub struct SyncMetadata {
    storage: Arc<dyn Storage>,
}

impl SyncMetadata {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Set sync metadata
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let record = json!({
            "key": key,
            "value": value,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.storage.put(Table::SyncMetadata, key, &record).await
    }

    /// Get sync metadata
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let record = self.storage.get(Table::SyncMetadata, key).await?;
        Ok(record.and_then(|r| r.get("value").and_then(Value::as_str).map(str::to_string)))
    }

    /// Get last sync timestamp
    pub async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>> {
        match self.get(LAST_SYNC_KEY).await? {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(|e| SyncCoreError::corrupt(Table::SyncMetadata.name(), LAST_SYNC_KEY, e.to_string())),
            None => Ok(None),
        }
    }

    /// Set last sync timestamp
    pub async fn set_last_sync_time(&self, at: DateTime<Utc>) -> Result<()> {
        self.set(LAST_SYNC_KEY, &at.to_rfc3339()).await
    }
}
