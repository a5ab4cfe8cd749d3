//! Rental Domain Entities
//!
//! The records mirrored from the rental service and cached locally:
//!
//! - `Property` - a building or site
//! - `Room` - a rentable unit inside a property
//! - `Tenant` - a person occupying a room
//! - `PaymentRecord` - rent due or paid for a room and period
//!
//! Every entity carries a string id and a [`SyncStatus`]. Optional fields are
//! serialized as explicit `null`, so an absent value survives a cache
//! round-trip as absent.

pub mod payment;
pub mod property;
pub mod room;
pub mod tenant;

pub use payment::{PaymentRecord, PaymentStatus};
pub use property::Property;
pub use room::{Room, RoomStatus};
pub use tenant::Tenant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a cached record matches what the server last confirmed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Confirmed by the server
    #[default]
    Synced,
    /// Modified locally, not yet confirmed
    Pending,
    /// A local change was abandoned after exhausting its retries
    Conflict,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Conflict => "conflict",
        }
    }
}

/// The kinds of entity the sync core knows how to store and replay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Room,
    Tenant,
    PaymentRecord,
    Property,
}

impl EntityType {
    /// All entity types, in a stable order
    pub const ALL: [EntityType; 4] = [
        EntityType::Property,
        EntityType::Room,
        EntityType::Tenant,
        EntityType::PaymentRecord,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Room => "Room",
            EntityType::Tenant => "Tenant",
            EntityType::PaymentRecord => "PaymentRecord",
            EntityType::Property => "Property",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Room" => Ok(EntityType::Room),
            "Tenant" => Ok(EntityType::Tenant),
            "PaymentRecord" => Ok(EntityType::PaymentRecord),
            "Property" => Ok(EntityType::Property),
            other => Err(format!("unknown entity type: {}", other)),
        }
    }
}

/// A domain record that can be cached by the entity store.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Which table and remote collection the record belongs to
    const ENTITY_TYPE: EntityType;

    /// Serialized name of the foreign key used by filtered reads, if any
    const FOREIGN_KEY: Option<&'static str> = None;

    fn id(&self) -> &str;

    fn sync_status(&self) -> SyncStatus;

    fn set_sync_status(&mut self, status: SyncStatus);
}

/// Generate a client-side id for a record created while offline
pub fn new_local_id() -> String {
    format!("local-{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_round_trip_through_str() {
        for entity_type in EntityType::ALL {
            assert_eq!(entity_type.as_str().parse::<EntityType>(), Ok(entity_type));
        }
        assert!("Lease".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_sync_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SyncStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(
            serde_json::from_str::<SyncStatus>("\"conflict\"").unwrap(),
            SyncStatus::Conflict
        );
    }

    #[test]
    fn test_local_ids_are_unique() {
        assert_ne!(new_local_id(), new_local_id());
        assert!(new_local_id().starts_with("local-"));
    }
}
