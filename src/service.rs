//! Composition root of the sync core
//!
//! Wires one storage backend, one remote client and one connectivity flag
//! into the entity store, change queue, sync engine, connectivity monitor and
//! offline manager. Applications hold a [`SyncCore`] instead of globals.

use crate::local_db::sync::SyncMetadata;
use crate::local_db::{EntityStore, LocalDatabase, MemoryStorage, Storage};
use crate::offline::{ChangeQueue, OfflineManager};
use crate::shared::config::SyncConfig;
use crate::shared::error::Result;
use crate::sync::{ConnectivityMonitor, RemoteApi, SyncEngine};
use std::sync::Arc;

/// The assembled sync core
#[derive(Debug, Clone)]
pub struct SyncCore {
    pub store: EntityStore,
    pub queue: Arc<ChangeQueue>,
    pub engine: Arc<SyncEngine>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub offline: OfflineManager,
}

impl SyncCore {
    /// Wire the components over an existing storage backend
    pub fn assemble(
        storage: Arc<dyn Storage>,
        remote: Arc<dyn RemoteApi>,
        config: &SyncConfig,
        initially_online: bool,
    ) -> Self {
        let store = EntityStore::new(storage.clone());
        let queue = Arc::new(ChangeQueue::new(storage.clone()));
        let metadata = SyncMetadata::new(storage);

        let monitor = ConnectivityMonitor::new(initially_online);
        let engine = Arc::new(
            SyncEngine::new(store.clone(), queue.clone(), metadata, remote, monitor.subscribe())
                .with_max_retry_count(config.max_retry_count),
        );
        let monitor = Arc::new(monitor.with_sync_engine(engine.clone()));
        let offline = OfflineManager::new(store.clone(), queue.clone(), engine.clone());

        Self {
            store,
            queue,
            engine,
            monitor,
            offline,
        }
    }

    /// Open the SQLite store at the configured path; starts offline
    pub async fn open(config: &SyncConfig, remote: Arc<dyn RemoteApi>) -> Result<Self> {
        let db = Arc::new(LocalDatabase::open(&config.database_path).await?);
        let core = Self::assemble(db, remote, config, false);
        core.engine.restore_state().await?;
        Ok(core)
    }

    /// Non-persistent core backed by [`MemoryStorage`]; starts offline
    pub fn in_memory(config: &SyncConfig, remote: Arc<dyn RemoteApi>) -> Self {
        Self::assemble(Arc::new(MemoryStorage::new()), remote, config, false)
    }
}
