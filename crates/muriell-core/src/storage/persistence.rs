//! Write-behind persistence of session snapshots.
//!
//! The worker drains the session's event channel on a blocking task and
//! writes each snapshot to a [`KvStore`]. Failures are logged and skipped;
//! they never reach the session, and in-memory state stays authoritative.

use tokio::task::JoinHandle;

use super::KvStore;
use crate::events::{Event, EventReceiver};

pub struct PersistenceWorker;

impl PersistenceWorker {
    /// Start draining `rx` into `store`.
    ///
    /// The handle resolves with the number of successful writes once every
    /// [`EventBus`](crate::events::EventBus) clone has been dropped.
    pub fn spawn<S>(store: S, mut rx: EventReceiver) -> JoinHandle<usize>
    where
        S: KvStore + 'static,
    {
        tokio::task::spawn_blocking(move || {
            let mut written = 0;
            while let Some(event) = rx.blocking_recv() {
                written += persist_event(&store, &event);
            }
            tracing::debug!(written, "persistence worker stopped");
            written
        })
    }
}

/// Write every snapshot an event carries. Returns how many writes succeeded.
pub fn persist_event(store: &dyn KvStore, event: &Event) -> usize {
    let snapshots = match event.persisted_snapshots() {
        Ok(snapshots) => snapshots,
        Err(err) => {
            tracing::warn!("failed to encode snapshot: {err}");
            return 0;
        }
    };

    let mut written = 0;
    for (key, value) in snapshots {
        match store.save(key, &value) {
            Ok(()) => written += 1,
            Err(err) => tracing::warn!(key, "failed to persist snapshot: {err}"),
        }
    }
    written
}
