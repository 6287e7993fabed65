//! Shared session setup for commands that touch user state.

use std::sync::Arc;

use muriell_core::{
    Config, EventBus, GatedSink, KvStore, Notification, NotificationSink, NotifyError,
    PersistenceWorker, Session, SessionState, SqliteStore,
};
use tokio::task::JoinHandle;

/// Prints notifications to stderr so stdout stays machine-readable.
pub struct StderrSink;

impl NotificationSink for StderrSink {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        eprintln!("[{}] {}", notification.title, notification.body);
        Ok(())
    }
}

/// A restored session plus the worker persisting its changes.
pub struct Context {
    pub session: Session,
    worker: JoinHandle<usize>,
}

impl Context {
    /// Open the store, restore the session and start persisting.
    ///
    /// On first run the seed state is written straight away so ids stay
    /// stable across invocations.
    pub fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        Self::open_with_sink(config, StderrSink)
    }

    /// Like [`Context::open`], delivering notifications through `sink`.
    pub fn open_with_sink<S>(config: &Config, sink: S) -> Result<Self, Box<dyn std::error::Error>>
    where
        S: NotificationSink + 'static,
    {
        let store = SqliteStore::open()?;
        let sink: Arc<dyn NotificationSink> =
            Arc::new(GatedSink::new(sink, config.notifications.enabled));
        let (bus, rx) = EventBus::channel();
        let session = Session::restore(&store, bus, sink);

        if SessionState::is_incomplete_in(&store)? {
            session.snapshot().persist_to(&store as &dyn KvStore)?;
        }

        let worker = PersistenceWorker::spawn(store, rx);
        Ok(Self { session, worker })
    }

    /// Drop the session and wait until every change is written.
    pub async fn finish(self) -> Result<(), Box<dyn std::error::Error>> {
        let Self { session, worker } = self;
        drop(session);
        let written = worker.await?;
        tracing::debug!(written, "session closed");
        Ok(())
    }
}
