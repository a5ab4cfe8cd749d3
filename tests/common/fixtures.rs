//! Sync core fixtures

use super::RecordingRemote;
use rentsync::shared::{Property, Room, SyncConfig};
use rentsync::SyncCore;
use std::path::Path;
use std::sync::Arc;

/// Offline in-memory core plus its mock remote
pub fn memory_core() -> (SyncCore, Arc<RecordingRemote>) {
    let remote = Arc::new(RecordingRemote::new());
    let core = SyncCore::in_memory(&SyncConfig::default(), remote.clone());
    (core, remote)
}

/// Offline SQLite core at `path`, sharing `remote`
pub async fn sqlite_core(path: &Path, remote: Arc<RecordingRemote>) -> SyncCore {
    let config = SyncConfig::builder().database_path(path).build().unwrap();
    SyncCore::open(&config, remote).await.unwrap()
}

pub fn sample_property() -> Property {
    let mut property = Property::new("Sunrise House", "12 Harbor Road");
    property.total_rooms = Some(8);
    property
}

pub fn sample_room(property_id: &str, number: &str) -> Room {
    let mut room = Room::new(property_id, number, 3_000_000);
    room.floor = Some(1);
    room.area_sqm = Some(18.5);
    room
}
