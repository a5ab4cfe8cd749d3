//! Room Data Structure
//!
//! A rentable unit belonging to a property.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_local_id, Entity, EntityType, SyncStatus};

/// Occupancy state of a room
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Vacant,
    Occupied,
    Maintenance,
}

/// A rentable room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    /// Unique room ID
    pub id: String,
    /// Property this room belongs to
    pub property_id: String,
    /// Room number as shown on the door
    pub room_number: String,
    pub floor: Option<i32>,
    /// Floor area in square meters
    pub area_sqm: Option<f64>,
    /// Monthly rent in minor currency units
    pub monthly_rent: i64,
    pub status: RoomStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl Room {
    /// Create a new vacant room with a client-side id
    pub fn new(property_id: impl Into<String>, room_number: impl Into<String>, monthly_rent: i64) -> Self {
        let now = Utc::now();
        Self {
            id: new_local_id(),
            property_id: property_id.into(),
            room_number: room_number.into(),
            floor: None,
            area_sqm: None,
            monthly_rent,
            status: RoomStatus::Vacant,
            notes: None,
            created_at: now,
            updated_at: now,
            sync_status: SyncStatus::Pending,
        }
    }
}

impl Entity for Room {
    const ENTITY_TYPE: EntityType = EntityType::Room;
    const FOREIGN_KEY: Option<&'static str> = Some("property_id");

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
