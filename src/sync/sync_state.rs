//! # Sync State Management
//!
//! Observable state of the sync engine and the report of a single drain.
//! Remote failures never escape a drain; this is where they surface.

use chrono::{DateTime, Utc};

/// Snapshot of the sync engine, published after every transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    /// A drain is running
    pub is_syncing: bool,
    /// Queue length after the last drain, or after the last enqueue seen by
    /// the offline manager
    pub pending_changes: usize,
    /// Completion time of the last drain that ran to the end
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Why the last drain could not finish, cleared by the next successful one
    pub sync_error: Option<String>,
}

/// Why a call to `sync_pending_changes` did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    AlreadySyncing,
}

/// Outcome of one `sync_pending_changes` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncReport {
    Skipped(SkipReason),
    Completed(DrainSummary),
    /// Local storage failed mid-drain; the message is also in `SyncState::sync_error`
    Failed { summary: DrainSummary, error: String },
}

impl SyncReport {
    pub fn summary(&self) -> Option<&DrainSummary> {
        match self {
            SyncReport::Skipped(_) => None,
            SyncReport::Completed(summary) | SyncReport::Failed { summary, .. } => Some(summary),
        }
    }
}

/// Per-change outcomes of a drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Replayed and removed from the queue
    pub succeeded: usize,
    /// Failed and left in the queue with one more retry recorded
    pub retried: usize,
    /// Failed for the last time and dropped from the queue
    pub abandoned: usize,
}

impl DrainSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.retried + self.abandoned
    }
}
