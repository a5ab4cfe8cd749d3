//! # Local Entity Operations
//!
//! Typed cache of rental entities. One table per entity type, keyed by the
//! entity id; reads never touch the network.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rentsync::local_db::{EntityStore, MemoryStorage};
//! use rentsync::shared::{Room, Tenant};
//! use std::sync::Arc;
//!
//! # async fn example(room: Room) -> rentsync::shared::error::Result<()> {
//! let store = EntityStore::new(Arc::new(MemoryStorage::new()));
//!
//! // Cache a record fetched from the server
//! store.cache(&room).await?;
//!
//! // Tenants of that room, readable offline
//! let tenants: Vec<Tenant> = store.get_cached(Some(&room.id)).await?;
//! # Ok(())
//! # }
//! ```

use super::{Filter, Storage, Table};
use crate::shared::entities::{
    Entity, EntityType, PaymentRecord, Property, Room, SyncStatus, Tenant,
};
use crate::shared::error::{Result, SyncCoreError};
use serde_json::Value;
use std::sync::Arc;

/// Local cache of server entities
#[derive(Debug, Clone)]
pub struct EntityStore {
    storage: Arc<dyn Storage>,
}

impl EntityStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Upsert a server-confirmed entity, tagged `synced`
    pub async fn cache<E: Entity>(&self, entity: &E) -> Result<()> {
        let mut entity = entity.clone();
        entity.set_sync_status(SyncStatus::Synced);
        self.write(&entity).await
    }

    /// Cache the result of an inbound fetch
    pub async fn cache_all<E: Entity>(&self, entities: &[E]) -> Result<()> {
        for entity in entities {
            self.cache(entity).await?;
        }
        tracing::debug!("Cached {} {} record(s)", entities.len(), E::ENTITY_TYPE);
        Ok(())
    }

    /// Optimistic local write, tagged `pending` until the server confirms it
    pub async fn save_local<E: Entity>(&self, entity: &E) -> Result<E> {
        let mut entity = entity.clone();
        entity.set_sync_status(SyncStatus::Pending);
        self.write(&entity).await?;
        Ok(entity)
    }

    /// Get one cached entity by id
    pub async fn get<E: Entity>(&self, id: &str) -> Result<Option<E>> {
        let table = Table::for_entity(E::ENTITY_TYPE);
        match self.storage.get(table, id).await? {
            Some(record) => Ok(Some(Self::decode(table, id, record)?)),
            None => Ok(None),
        }
    }

    /// All cached entities of a type, optionally restricted to one foreign key value
    ///
    /// Rooms filter by `property_id`; tenants and payment records by
    /// `room_id`. Properties have no foreign key.
    pub async fn get_cached<E: Entity>(&self, foreign_key: Option<&str>) -> Result<Vec<E>> {
        let table = Table::for_entity(E::ENTITY_TYPE);
        let filter = match (foreign_key, E::FOREIGN_KEY) {
            (None, _) => None,
            (Some(value), Some(field)) => Some(Filter::eq(field, value)),
            (Some(_), None) => return Err(SyncCoreError::invalid_filter(E::ENTITY_TYPE.as_str())),
        };

        let records = self.storage.get_all(table, filter).await?;
        let mut entities = Vec::with_capacity(records.len());
        for record in records {
            let key = record
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            entities.push(Self::decode(table, &key, record)?);
        }

        Ok(entities)
    }

    /// Explicit local delete
    pub async fn delete_local(&self, entity_type: EntityType, id: &str) -> Result<bool> {
        self.storage.delete(Table::for_entity(entity_type), id).await
    }

    /// Mark a record as confirmed by the server; `false` if it is not cached
    pub async fn mark_synced(&self, entity_type: EntityType, id: &str) -> Result<bool> {
        self.set_status(entity_type, id, SyncStatus::Synced).await
    }

    /// Mark a record whose local change was abandoned; `false` if it is not cached
    pub async fn mark_conflict(&self, entity_type: EntityType, id: &str) -> Result<bool> {
        self.set_status(entity_type, id, SyncStatus::Conflict).await
    }

    /// Number of cached entities of a type
    pub async fn count(&self, entity_type: EntityType) -> Result<usize> {
        self.storage.count(Table::for_entity(entity_type)).await
    }

    pub async fn get_cached_properties(&self) -> Result<Vec<Property>> {
        self.get_cached(None).await
    }

    pub async fn get_cached_rooms(&self, property_id: Option<&str>) -> Result<Vec<Room>> {
        self.get_cached(property_id).await
    }

    pub async fn get_cached_tenants(&self, room_id: Option<&str>) -> Result<Vec<Tenant>> {
        self.get_cached(room_id).await
    }

    pub async fn get_cached_payments(&self, room_id: Option<&str>) -> Result<Vec<PaymentRecord>> {
        self.get_cached(room_id).await
    }

    async fn write<E: Entity>(&self, entity: &E) -> Result<()> {
        let record = serde_json::to_value(entity)?;
        self.storage
            .put(Table::for_entity(E::ENTITY_TYPE), entity.id(), &record)
            .await
    }

    /// Replace the status field of a stored record without decoding it
    async fn set_status(&self, entity_type: EntityType, id: &str, status: SyncStatus) -> Result<bool> {
        let table = Table::for_entity(entity_type);
        let Some(mut record) = self.storage.get(table, id).await? else {
            return Ok(false);
        };

        let Some(fields) = record.as_object_mut() else {
            return Err(SyncCoreError::corrupt(table.name(), id, "record is not an object"));
        };
        fields.insert("sync_status".to_string(), Value::from(status.as_str()));

        self.storage.put(table, id, &record).await?;
        Ok(true)
    }

    fn decode<E: Entity>(table: Table, key: &str, record: Value) -> Result<E> {
        serde_json::from_value(record).map_err(|e| SyncCoreError::corrupt(table.name(), key, e.to_string()))
    }
}
