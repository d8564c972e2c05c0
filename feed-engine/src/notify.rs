//! Notification sink abstraction.
//!
//! The engine decides *when* to surface a user-facing signal; the sink
//! decides *how* (toast, banner, log line). The engine never depends on
//! the sink's outcome.

use std::sync::{Arc, Mutex};

/// What kind of signal is being surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Data was refreshed and the displayed content changed.
    Success,
    /// A non-blocking failure while stale data stays on screen.
    Error,
}

/// Receiver of user-facing signals.
pub trait NotificationSink: Send + Sync {
    /// Surface one signal. Must not block.
    fn notify(&self, kind: NoticeKind, text: &str);
}

/// Sink that forwards notices to `tracing`.
///
/// Useful as a default when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, kind: NoticeKind, text: &str) {
        match kind {
            NoticeKind::Success => tracing::info!("{text}"),
            NoticeKind::Error => tracing::warn!("{text}"),
        }
    }
}

/// Sink that records notices for test verification.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notices: Arc<Mutex<Vec<(NoticeKind, String)>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far, in order.
    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.lock().unwrap().clone()
    }

    /// How many success notices were received.
    pub fn success_count(&self) -> usize {
        self.count(NoticeKind::Success)
    }

    /// How many error notices were received.
    pub fn error_count(&self) -> usize {
        self.count(NoticeKind::Error)
    }

    fn count(&self, kind: NoticeKind) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, kind: NoticeKind, text: &str) {
        self.notices.lock().unwrap().push((kind, text.to_string()));
    }
}
