//! Notification sink for user-visible mutation outcomes.
//!
//! Notifications are one-shot events raised by the mutation coordinator at
//! the `pending -> success` and `pending -> error` transitions. Sinks are
//! fire-and-forget: they cannot fail and must not block.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);

    fn notify_success(&self, message: &str) {
        self.notify(NotificationKind::Success, message);
    }

    fn notify_error(&self, message: &str) {
        self.notify(NotificationKind::Error, message);
    }
}

/// Default sink: writes each notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => info!(message, "notification"),
            NotificationKind::Error => warn!(message, "notification"),
        }
    }
}

/// Sink that keeps every notification in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<(NotificationKind, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(NotificationKind, String)> {
        self.events.lock().clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.events.lock().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.events.lock().push((kind, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let sink = RecordingNotifier::new();
        sink.notify_success("saved");
        sink.notify_error("failed");
        assert_eq!(
            sink.events(),
            vec![
                (NotificationKind::Success, "saved".to_string()),
                (NotificationKind::Error, "failed".to_string()),
            ]
        );
        assert_eq!(sink.count(NotificationKind::Error), 1);
    }
}
