//! RentSync - Offline-First Sync Core
//!
//! Local persistence and synchronization for a rental-management client.
//! Every read is served from the local store and every write lands there
//! first; mutations are recorded in a durable queue and replayed against the
//! rental API whenever the device is online.
//!
//! # Module Structure
//!
//! - **`shared`** - entity types, pending change records, errors, configuration
//! - **`local_db`** - storage interface, SQLite and in-memory backends, entity cache
//! - **`offline`** - change queue and the optimistic write path
//! - **`sync`** - sync engine, connectivity monitor, remote client
//! - **`service`** - [`SyncCore`], the wired-up set of the above
//!
//! # Usage
//!
//! ```rust,no_run
//! use rentsync::shared::{Room, SyncConfig};
//! use rentsync::sync::HttpRemoteApi;
//! use rentsync::SyncCore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::load(None)?;
//! let remote = Arc::new(HttpRemoteApi::new(&config)?);
//! let core = SyncCore::open(&config, remote).await?;
//!
//! core.offline.create(&Room::new("property-1", "101", 3_500_000)).await?;
//!
//! // Reachability callback: drains the queue on reconnect
//! core.monitor.handle_event(true).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! All components are `Send + Sync` and shared through `Arc`. At most one
//! drain runs at a time; concurrent requests return immediately.

/// Shared types and data structures
pub mod shared;

/// Local persistence
pub mod local_db;

/// Offline write path and change queue
pub mod offline;

/// Queue replay and connectivity
pub mod sync;

/// Composition root
pub mod service;

pub use service::SyncCore;
