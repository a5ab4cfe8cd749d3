//! # Sync Engine
//!
//! Replays the pending change queue against the remote service once the
//! device is online.
//!
//! ## Architecture
//!
//! - **Engine** ([`SyncEngine`]): single drain worker guarded by an
//!   `idle`/`syncing` flag
//! - **Network Monitor** ([`ConnectivityMonitor`]): online flag, triggers a
//!   drain on every offline → online transition
//! - **Remote** ([`RemoteApi`]): injected create/update/delete client
//! - **Sync State** ([`SyncState`]): observable outcome of the last drain
//! - **Metrics** ([`SyncMetrics`]): cumulative drain statistics
//!
//! ## Drain rules
//!
//! Changes are replayed one at a time in queue order. A success removes the
//! change and marks the entity `synced` once nothing else is queued for it.
//! A failure records one more retry, unless the attempt was the last one the
//! budget allows, in which case the change is dropped and the entity is
//! marked `conflict`. Either way the drain moves on to the next change.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rentsync::sync::SyncReport;
//! # async fn example(engine: &rentsync::sync::SyncEngine) {
//! match engine.sync_pending_changes().await {
//!     SyncReport::Completed(summary) => println!("synced {}", summary.succeeded),
//!     other => println!("{:?}", other),
//! }
//! # }
//! ```

pub mod metrics;
pub mod network_monitor;
pub mod remote;
pub mod sync_state;

pub use metrics::SyncMetrics;
pub use network_monitor::ConnectivityMonitor;
pub use remote::{HttpRemoteApi, RemoteApi};
pub use sync_state::{DrainSummary, SkipReason, SyncReport, SyncState};

use crate::local_db::sync::SyncMetadata;
use crate::local_db::EntityStore;
use crate::offline::ChangeQueue;
use crate::shared::change::{ChangeOperation, PendingChange};
use crate::shared::config::MAX_RETRY_COUNT;
use crate::shared::error::{RemoteError, Result};
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};

/// Drains the change queue through the remote API
pub struct SyncEngine {
    store: EntityStore,
    queue: Arc<ChangeQueue>,
    metadata: SyncMetadata,
    remote: Arc<dyn RemoteApi>,
    online: watch::Receiver<bool>,
    syncing: AtomicBool,
    state: watch::Sender<SyncState>,
    metrics: Mutex<SyncMetrics>,
    max_retry_count: u32,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("queue", &self.queue)
            .field("online", &*self.online.borrow())
            .field("syncing", &self.syncing)
            .field("max_retry_count", &self.max_retry_count)
            .finish_non_exhaustive()
    }
}

/// Holds the `syncing` flag for the lifetime of one drain
///
/// Dropping the guard returns the engine to `idle` on every exit path.
struct SyncingGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<SyncState>,
}

impl<'a> SyncingGuard<'a> {
    fn acquire(flag: &'a AtomicBool, state: &'a watch::Sender<SyncState>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        state.send_modify(|s| s.is_syncing = true);
        Some(Self { flag, state })
    }
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_syncing = false);
        self.flag.store(false, Ordering::Release);
    }
}

/// What the drain did with one change after its replay failed
enum FailureOutcome {
    Retried,
    Abandoned,
}

impl SyncEngine {
    /// Create an engine
    ///
    /// `online` is normally [`ConnectivityMonitor::subscribe`].
    pub fn new(
        store: EntityStore,
        queue: Arc<ChangeQueue>,
        metadata: SyncMetadata,
        remote: Arc<dyn RemoteApi>,
        online: watch::Receiver<bool>,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            store,
            queue,
            metadata,
            remote,
            online,
            syncing: AtomicBool::new(false),
            state,
            metrics: Mutex::new(SyncMetrics::new()),
            max_retry_count: MAX_RETRY_COUNT,
        }
    }

    /// Override the retry budget
    pub fn with_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.max_retry_count = max_retry_count.max(1);
        self
    }

    pub fn max_retry_count(&self) -> u32 {
        self.max_retry_count
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Current sync state
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Receive every published sync state
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Cumulative drain statistics
    pub async fn metrics(&self) -> SyncMetrics {
        self.metrics.lock().await.clone()
    }

    /// Re-read the queue length into the published state
    pub async fn refresh_pending_count(&self) -> Result<usize> {
        let count = self.queue.get_pending_changes_count().await?;
        self.state.send_modify(|s| s.pending_changes = count);
        Ok(count)
    }

    /// Load the persisted last sync time into the published state
    pub async fn restore_state(&self) -> Result<()> {
        let last_sync_at = self.metadata.last_sync_time().await?;
        let pending = self.queue.get_pending_changes_count().await?;
        self.state.send_modify(|s| {
            s.last_sync_at = last_sync_at;
            s.pending_changes = pending;
        });
        Ok(())
    }

    /// Drain the change queue
    ///
    /// Returns immediately when offline or when another drain is running.
    /// Remote failures are absorbed into the queue's retry bookkeeping; local
    /// storage failures end the drain and are reported through
    /// [`SyncState::sync_error`] and the returned report.
    pub async fn sync_pending_changes(&self) -> SyncReport {
        if !self.is_online() {
            tracing::debug!("Skipping sync: offline");
            return SyncReport::Skipped(SkipReason::Offline);
        }

        let Some(_guard) = SyncingGuard::acquire(&self.syncing, &self.state) else {
            tracing::debug!("Skipping sync: a drain is already running");
            return SyncReport::Skipped(SkipReason::AlreadySyncing);
        };

        let started = Instant::now();
        let mut summary = DrainSummary::default();
        let drained = self.drain(&mut summary).await;
        let completed_at = Utc::now();
        let result = match drained {
            Ok(()) => self.metadata.set_last_sync_time(completed_at).await,
            Err(e) => Err(e),
        };
        let pending = self.queue.get_pending_changes_count().await.ok();
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                self.state.send_modify(|s| {
                    s.last_sync_at = Some(completed_at);
                    s.sync_error = None;
                    if let Some(pending) = pending {
                        s.pending_changes = pending;
                    }
                });
                self.metrics.lock().await.record_sync_success(&summary, elapsed);
                tracing::info!(
                    attempted = summary.attempted(),
                    succeeded = summary.succeeded,
                    retried = summary.retried,
                    abandoned = summary.abandoned,
                    "Sync finished in {:?}",
                    elapsed
                );
                SyncReport::Completed(summary)
            }
            Err(e) => {
                let error = e.to_string();
                self.state.send_modify(|s| {
                    s.sync_error = Some(error.clone());
                    if let Some(pending) = pending {
                        s.pending_changes = pending;
                    }
                });
                self.metrics.lock().await.record_sync_failure(&summary, elapsed);
                tracing::error!("Sync failed after {:?}: {}", elapsed, error);
                SyncReport::Failed { summary, error }
            }
        }
    }

    /// One pass over the queue
    async fn drain(&self, summary: &mut DrainSummary) -> Result<()> {
        let changes = self.queue.get_pending_changes().await?;
        self.state.send_modify(|s| s.pending_changes = changes.len());
        tracing::info!("Syncing {} pending change(s)", changes.len());

        for change in changes {
            match remote::replay(self.remote.as_ref(), &change).await {
                Ok(()) => {
                    self.on_success(&change).await?;
                    summary.succeeded += 1;
                }
                Err(error) => match self.on_failure(&change, &error).await? {
                    FailureOutcome::Retried => summary.retried += 1,
                    FailureOutcome::Abandoned => summary.abandoned += 1,
                },
            }
        }

        Ok(())
    }

    async fn on_success(&self, change: &PendingChange) -> Result<()> {
        self.queue.remove_change(&change.id).await?;

        if change.operation != ChangeOperation::Delete
            && !self
                .queue
                .has_pending_for(change.entity_type, &change.entity_id)
                .await?
        {
            self.store
                .mark_synced(change.entity_type, &change.entity_id)
                .await?;
        }

        tracing::debug!(
            "Replayed {} {} {}",
            change.operation.as_str(),
            change.entity_type,
            change.entity_id
        );
        Ok(())
    }

    async fn on_failure(&self, change: &PendingChange, error: &RemoteError) -> Result<FailureOutcome> {
        let attempts = change.retry_count.saturating_add(1);

        if attempts >= self.max_retry_count {
            self.queue.remove_change(&change.id).await?;
            if change.operation != ChangeOperation::Delete {
                self.store
                    .mark_conflict(change.entity_type, &change.entity_id)
                    .await?;
            }
            tracing::warn!(
                "Abandoning {} {} {} after {} failed attempt(s): {}",
                change.operation.as_str(),
                change.entity_type,
                change.entity_id,
                attempts,
                error
            );
            return Ok(FailureOutcome::Abandoned);
        }

        self.queue.increment_retry_count(&change.id).await?;
        tracing::warn!(
            "Replay of {} failed (attempt {}/{}): {}",
            change.id,
            attempts,
            self.max_retry_count,
            error
        );
        Ok(FailureOutcome::Retried)
    }
}
