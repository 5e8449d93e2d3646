//! Success notifications

use std::sync::Arc;

/// Fire-and-forget sink for user-facing success messages
pub trait Notifier: Send + Sync {
    /// Display a success message
    fn notify_success(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify_success(&self, message: &str) {
        (**self).notify_success(message);
    }
}

/// Notifier that records messages as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        tracing::info!(target: "tpl::notify", message, "success");
    }
}
