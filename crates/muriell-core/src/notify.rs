//! User notification sinks.
//!
//! Delivery is best-effort. A failing sink is logged by the caller and never
//! turns into a core error.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// A user-facing alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Warning sent when a violation is recorded.
    pub fn violation_warning() -> Self {
        Self::new(
            "MURIELL WARNING",
            "Wasting time detected. Focus on your goals.",
        )
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Host refused or has not granted notification permission
    #[error("notification permission not granted")]
    PermissionDenied,

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Fire-and-forget alert delivery. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log. Used by long-running hosts where
/// stderr is not watched.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(title = %notification.title, "{}", notification.body);
        Ok(())
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Keeps every notification in memory. Used by tests and the CLI to report
/// what was sent during a command.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

/// Wraps a sink and forwards only when `enabled` is set, mirroring the
/// `notifications.enabled` config switch.
pub struct GatedSink<S> {
    inner: S,
    enabled: bool,
}

impl<S: NotificationSink> GatedSink<S> {
    pub fn new(inner: S, enabled: bool) -> Self {
        Self { inner, enabled }
    }
}

impl<S: NotificationSink> NotificationSink for GatedSink<S> {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::PermissionDenied);
        }
        self.inner.notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.notify(&Notification::new("a", "1")).unwrap();
        sink.notify(&Notification::violation_warning()).unwrap();
        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].title, "MURIELL WARNING");
    }

    #[test]
    fn tracing_and_null_sinks_always_accept() {
        let n = Notification::violation_warning();
        assert!(TracingSink.notify(&n).is_ok());
        assert!(NullSink.notify(&n).is_ok());
        assert!(GatedSink::new(NullSink, true).notify(&n).is_ok());
    }

    #[test]
    fn gated_sink_refuses_when_disabled() {
        let sink = GatedSink::new(RecordingSink::new(), false);
        assert!(matches!(
            sink.notify(&Notification::new("a", "b")),
            Err(NotifyError::PermissionDenied)
        ));
        assert!(sink.inner.sent().is_empty());
    }
}
