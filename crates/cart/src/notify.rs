//! User-facing notification sinks.
//!
//! The store reports every rejected operation through a [`NotificationSink`]
//! instead of returning an error. Delivery is fire-and-forget.

use std::sync::{Mutex, PoisonError};

/// Receives user-facing error messages.
pub trait NotificationSink: Send + Sync {
    /// Surface an error message to the shopper.
    fn error(&self, message: &str);
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

/// Sink that forwards notifications to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(notification = %message, "Cart notification");
    }
}

/// Sink that keeps every message in memory.
///
/// Callers drain it with [`RecordingNotifier::take`] to display the messages
/// themselves.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return every message received so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_recording_notifier_take_drains() {
        let sink = RecordingNotifier::new();
        sink.error("first");
        sink.error("second");

        assert_eq!(sink.take(), vec!["first", "second"]);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_arc_forwards_to_inner_sink() {
        let sink = Arc::new(RecordingNotifier::new());
        let shared: Arc<RecordingNotifier> = Arc::clone(&sink);
        NotificationSink::error(&shared, "out of stock");

        assert_eq!(sink.messages(), vec!["out of stock"]);
    }
}
