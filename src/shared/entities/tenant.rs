//! Tenant Data Structure
//!
//! A person renting a room.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{new_local_id, Entity, EntityType, SyncStatus};

/// A tenant of a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    /// Unique tenant ID
    pub id: String,
    /// Room the tenant occupies
    pub room_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// National ID or passport number
    pub id_number: Option<String>,
    pub move_in_date: NaiveDate,
    /// Set once the tenant has left
    pub move_out_date: Option<NaiveDate>,
    /// Security deposit in minor currency units
    pub deposit: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl Tenant {
    /// Create a new tenant with a client-side id
    pub fn new(room_id: impl Into<String>, full_name: impl Into<String>, move_in_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: new_local_id(),
            room_id: room_id.into(),
            full_name: full_name.into(),
            phone: None,
            email: None,
            id_number: None,
            move_in_date,
            move_out_date: None,
            deposit: None,
            created_at: now,
            updated_at: now,
            sync_status: SyncStatus::Pending,
        }
    }
}

impl Entity for Tenant {
    const ENTITY_TYPE: EntityType = EntityType::Tenant;
    const FOREIGN_KEY: Option<&'static str> = Some("room_id");

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
