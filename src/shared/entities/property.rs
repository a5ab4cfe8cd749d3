//! Property Data Structure
//!
//! A building or site that contains rentable rooms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_local_id, Entity, EntityType, SyncStatus};

/// A rental property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    /// Unique property ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Owner or landlord name
    pub owner_name: Option<String>,
    /// Number of rooms the property was built with
    pub total_rooms: Option<u32>,
    /// Free-form notes
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl Property {
    /// Create a new property with a client-side id
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_local_id(),
            name: name.into(),
            address: address.into(),
            owner_name: None,
            total_rooms: None,
            notes: None,
            created_at: now,
            updated_at: now,
            sync_status: SyncStatus::Pending,
        }
    }
}

impl Entity for Property {
    const ENTITY_TYPE: EntityType = EntityType::Property;

    fn id(&self) -> &str {
        &self.id
    }

    fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    fn set_sync_status(&mut self, status: SyncStatus) {
        self.sync_status = status;
    }
}
