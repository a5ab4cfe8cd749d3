//! Payment Record Data Structure
//!
//! Rent due for a room over one billing period, and how much of it was paid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_local_id, Entity, EntityType, SyncStatus};

/// Settlement state of a payment record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

/// Rent payment for one room and period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    /// Unique payment ID
    pub id: String,
    /// Room the payment is for
    pub room_id: String,
    /// Tenant who owes the payment, if known
    pub tenant_id: Option<String>,
    /// Billing period, `YYYY-MM`
    pub period: String,
    /// Amount due in minor currency units
    pub amount: i64,
    /// Amount received so far in minor currency units
    pub paid_amount: i64,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl PaymentRecord {
    /// Create a new unpaid record with a client-side id
    pub fn new(room_id: impl Into<String>, period: impl Into<String>, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: new_local_id(),
            room_id: room_id.into(),
            tenant_id: None,
            period: period.into(),
            amount,
            paid_amount: 0,
            status: PaymentStatus::Unpaid,
            paid_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
            sync_status: SyncStatus::Pending,
        }
    }
}

impl Entity for PaymentRecord {
    const ENTITY_TYPE: EntityType = EntityType::PaymentRecord;
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
