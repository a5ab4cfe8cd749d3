//! # Offline Mutations
//!
//! Entry point for every change the UI makes to rental data. A mutation is
//! applied to the local cache first (tagged `pending`) and recorded in the
//! change queue in the same call, so it survives a crash and is readable
//! immediately whether or not the network is up.
//!
//! ## Key Components
//!
//! - `queue.rs`: durable pending change queue
//! - [`OfflineManager`]: optimistic write + enqueue, then an immediate drain
//!   attempt when online
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rentsync::offline::OfflineManager;
//! use rentsync::shared::Room;
//!
//! # async fn example(offline: &OfflineManager) -> rentsync::shared::error::Result<()> {
//! let room = offline.create(&Room::new("property-1", "101", 3_500_000)).await?;
//! offline.delete::<Room>(&room.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod queue;

pub use queue::ChangeQueue;

use crate::local_db::EntityStore;
use crate::shared::change::{ChangeOperation, NewChange};
use crate::shared::entities::Entity;
use crate::shared::error::Result;
use crate::sync::SyncEngine;
use serde_json::json;
use std::sync::Arc;

/// Records local mutations for later replay
#[derive(Debug, Clone)]
pub struct OfflineManager {
    store: EntityStore,
    queue: Arc<ChangeQueue>,
    engine: Arc<SyncEngine>,
}

impl OfflineManager {
    pub fn new(store: EntityStore, queue: Arc<ChangeQueue>, engine: Arc<SyncEngine>) -> Self {
        Self { store, queue, engine }
    }

    /// Create an entity locally and queue its `create`
    pub async fn create<E: Entity>(&self, entity: &E) -> Result<E> {
        self.record(entity, ChangeOperation::Create).await
    }

    /// Update an entity locally and queue its `update`
    pub async fn update<E: Entity>(&self, entity: &E) -> Result<E> {
        self.record(entity, ChangeOperation::Update).await
    }

    /// Delete an entity locally and queue its `delete`
    pub async fn delete<E: Entity>(&self, id: &str) -> Result<()> {
        self.store.delete_local(E::ENTITY_TYPE, id).await?;
        self.queue
            .queue_change(NewChange::now(
                E::ENTITY_TYPE,
                id,
                ChangeOperation::Delete,
                json!({ "id": id }),
            ))
            .await?;
        self.after_enqueue().await
    }

    /// Number of changes not yet confirmed by the server
    pub async fn pending_count(&self) -> Result<usize> {
        self.queue.get_pending_changes_count().await
    }

    async fn record<E: Entity>(&self, entity: &E, operation: ChangeOperation) -> Result<E> {
        let saved = self.store.save_local(entity).await?;
        let data = serde_json::to_value(&saved)?;

        self.queue
            .queue_change(NewChange::now(E::ENTITY_TYPE, saved.id(), operation, data))
            .await?;
        self.after_enqueue().await?;

        // The drain may already have confirmed it
        Ok(self.store.get::<E>(saved.id()).await?.unwrap_or(saved))
    }

    async fn after_enqueue(&self) -> Result<()> {
        self.engine.refresh_pending_count().await?;

        if self.engine.is_online() {
            let report = self.engine.sync_pending_changes().await;
            tracing::debug!("Write-through sync: {:?}", report);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::SyncConfig;
    use crate::shared::entities::{EntityType, Room, SyncStatus};
    use crate::SyncCore;
    use crate::sync::HttpRemoteApi;
    use pretty_assertions::assert_eq;

    /// An offline core; the HTTP client is never reached
    fn offline_core() -> SyncCore {
        let config = SyncConfig::default();
        let remote = Arc::new(HttpRemoteApi::new(&config).unwrap());
        SyncCore::in_memory(&config, remote)
    }

    #[tokio::test]
    async fn test_create_is_cached_and_queued() {
        let core = offline_core();
        let room = core
            .offline
            .create(&Room::new("p1", "101", 2_500_000))
            .await
            .unwrap();

        assert_eq!(room.sync_status, SyncStatus::Pending);
        assert_eq!(core.store.get::<Room>(&room.id).await.unwrap(), Some(room.clone()));

        let pending = core.queue.get_pending_changes().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].entity_type, EntityType::Room);
        assert_eq!(pending[0].operation, ChangeOperation::Create);
        assert_eq!(pending[0].data, serde_json::to_value(&room).unwrap());
        assert_eq!(core.engine.state().pending_changes, 1);
    }

    #[tokio::test]
    async fn test_update_queues_new_snapshot() {
        let core = offline_core();
        let mut room = core
            .offline
            .create(&Room::new("p1", "101", 2_500_000))
            .await
            .unwrap();
        room.monthly_rent = 2_800_000;
        core.offline.update(&room).await.unwrap();

        let pending = core.queue.get_pending_changes().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].operation, ChangeOperation::Update);
        assert_eq!(pending[1].data["monthly_rent"], 2_800_000);
        assert_eq!(core.offline.pending_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_cache_entry_and_queues_id() {
        let core = offline_core();
        let room = core
            .offline
            .create(&Room::new("p1", "101", 2_500_000))
            .await
            .unwrap();

        core.offline.delete::<Room>(&room.id).await.unwrap();

        assert!(core.store.get::<Room>(&room.id).await.unwrap().is_none());
        let pending = core.queue.get_pending_changes().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].operation, ChangeOperation::Delete);
        assert_eq!(pending[1].data, json!({ "id": room.id }));
    }
}
