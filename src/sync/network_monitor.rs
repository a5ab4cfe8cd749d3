//! # Network Monitor
//!
//! Tracks whether the device is online and starts a drain each time it comes
//! back online.
//!
//! Platform reachability callbacks tend to fire several times for one logical
//! change (Wi-Fi and cellular flapping, duplicate notifications). Events are
//! compared against the current value, so only real transitions count, and
//! each offline → online transition starts exactly one drain. Going offline
//! only flips the flag; a drain already in flight is left to fail on its own.

use super::{SyncEngine, SyncReport};
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A change of the online flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
    Unchanged,
}

/// Online flag plus the drain trigger
#[derive(Debug)]
pub struct ConnectivityMonitor {
    status: watch::Sender<bool>,
    engine: Option<Arc<SyncEngine>>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (status, _) = watch::channel(initially_online);
        Self { status, engine: None }
    }

    /// Drain through `engine` on every offline → online transition
    pub fn with_sync_engine(mut self, engine: Arc<SyncEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn is_online(&self) -> bool {
        *self.status.borrow()
    }

    /// Receiver of the online flag; also the change notification
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }

    /// Apply one reachability event
    ///
    /// The flag is compared and updated in a single step, so concurrent
    /// duplicate events yield at most one transition.
    pub fn set_online(&self, online: bool) -> Transition {
        let changed = self.status.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        match (changed, online) {
            (false, _) => Transition::Unchanged,
            (true, true) => {
                tracing::info!("Network connectivity restored");
                Transition::WentOnline
            }
            (true, false) => {
                tracing::info!("Network connectivity lost");
                Transition::WentOffline
            }
        }
    }

    /// Apply one reachability event and run the drain it triggers, if any
    ///
    /// The drain runs inline; the flag cannot change again until this call
    /// returns. Event sources that keep firing should go through
    /// [`spawn_event`](Self::spawn_event) or [`watch`](Self::watch).
    pub async fn handle_event(&self, online: bool) -> Option<SyncReport> {
        match self.set_online(online) {
            Transition::WentOnline => match &self.engine {
                Some(engine) => Some(engine.sync_pending_changes().await),
                None => None,
            },
            Transition::WentOffline | Transition::Unchanged => None,
        }
    }

    /// Apply one reachability event and start the drain it triggers on its
    /// own task
    pub fn spawn_event(&self, online: bool) -> Option<JoinHandle<SyncReport>> {
        match self.set_online(online) {
            Transition::WentOnline => {
                let engine = self.engine.clone()?;
                Some(tokio::spawn(async move {
                    let report = engine.sync_pending_changes().await;
                    tracing::debug!("Reconnect sync: {:?}", report);
                    report
                }))
            }
            Transition::WentOffline | Transition::Unchanged => None,
        }
    }

    /// Consume a reachability stream on a background task
    ///
    /// Every event updates the flag as it arrives, including while a drain it
    /// started is still running. The task ends once the stream has ended and
    /// those drains have finished.
    pub fn watch<S>(self: Arc<Self>, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = bool> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut events = Box::pin(events);
            let mut drains: Vec<JoinHandle<SyncReport>> = Vec::new();

            while let Some(online) = events.next().await {
                drains.retain(|drain| !drain.is_finished());
                if let Some(drain) = self.spawn_event(online) {
                    drains.push(drain);
                }
            }
            tracing::debug!("Reachability stream closed");

            for drain in drains {
                if let Err(e) = drain.await {
                    tracing::error!("Reconnect sync task failed: {}", e);
                }
            }
        })
    }
}
