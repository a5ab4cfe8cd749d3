//! # Sync Metrics
//!
//! Cumulative counters over every drain the engine has run.

use super::sync_state::DrainSummary;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncMetrics {
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub failed_syncs: u64,
    pub changes_succeeded: u64,
    pub changes_retried: u64,
    pub changes_abandoned: u64,
    pub average_sync_duration: Duration,
    pub last_sync_duration: Option<Duration>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sync_success(&mut self, summary: &DrainSummary, duration: Duration) {
        self.total_syncs += 1;
        self.successful_syncs += 1;
        self.record_changes(summary);
        self.last_sync_duration = Some(duration);

        // Update rolling average
        let total_duration = self.average_sync_duration * (self.successful_syncs - 1) as u32 + duration;
        self.average_sync_duration = total_duration / self.successful_syncs as u32;
    }

    pub fn record_sync_failure(&mut self, summary: &DrainSummary, duration: Duration) {
        self.total_syncs += 1;
        self.failed_syncs += 1;
        self.record_changes(summary);
        self.last_sync_duration = Some(duration);
    }

    fn record_changes(&mut self, summary: &DrainSummary) {
        self.changes_succeeded += summary.succeeded as u64;
        self.changes_retried += summary.retried as u64;
        self.changes_abandoned += summary.abandoned as u64;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_syncs == 0 {
            0.0
        } else {
            self.successful_syncs as f64 / self.total_syncs as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_average_and_rate() {
        let mut metrics = SyncMetrics::new();
        let summary = DrainSummary {
            succeeded: 1,
            retried: 2,
            abandoned: 0,
        };

        metrics.record_sync_success(&summary, Duration::from_millis(100));
        metrics.record_sync_success(&summary, Duration::from_millis(300));
        metrics.record_sync_failure(&DrainSummary::default(), Duration::from_millis(50));

        assert_eq!(metrics.total_syncs, 3);
        assert_eq!(metrics.average_sync_duration, Duration::from_millis(200));
        assert_eq!(metrics.last_sync_duration, Some(Duration::from_millis(50)));
        assert_eq!(metrics.changes_succeeded, 2);
        assert_eq!(metrics.changes_retried, 4);
        assert!((metrics.success_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }
}
