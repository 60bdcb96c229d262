//! User-facing notifications (toasts)
//!
//! Injected into the persistence layer instead of a global broadcast.

use std::sync::Arc;

use shared::{NotificationLevel, NotificationPayload};
use tokio::sync::broadcast;

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: NotificationPayload);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: NotificationPayload) {
        (**self).notify(notification)
    }
}

/// Writes notifications to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: NotificationPayload) {
        match notification.level {
            NotificationLevel::Info => {
                tracing::info!(title = %notification.title, "{}", notification.message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(title = %notification.title, "{}", notification.message)
            }
            NotificationLevel::Error => {
                tracing::error!(title = %notification.title, "{}", notification.message)
            }
        }
    }
}

/// Broadcasts notifications to any number of UI subscribers
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<NotificationPayload>,
}

impl ChannelNotifier {
    /// Create a channel keeping the last `capacity` notifications per
    /// subscriber (at least one)
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationPayload> {
        self.tx.subscribe()
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: NotificationPayload) {
        // No subscriber yet is not an error
        if self.tx.send(notification).is_err() {
            tracing::trace!("Notification dropped, no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let notifier = ChannelNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.notify(NotificationPayload::error("Reorder failed", "network timeout"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, NotificationLevel::Error);
        assert_eq!(received.message, "network timeout");
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let notifier = ChannelNotifier::new(0);
        let mut rx = notifier.subscribe();

        notifier.notify(NotificationPayload::info("Order saved", "The slider order was updated"));

        assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Info);
    }

    #[test]
    fn test_channel_notifier_without_subscribers() {
        let notifier = ChannelNotifier::default();
        notifier.notify(NotificationPayload::info("Saved", "Order saved"));
    }

    #[test]
    fn test_arc_notifier() {
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
        notifier.notify(NotificationPayload::warning("Refreshed", "Pending changes discarded"));
    }
}
