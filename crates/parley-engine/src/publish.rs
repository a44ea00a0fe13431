//! Publish capability seam and in-process implementations.
//!
//! Delivery is at-least-once and best-effort: a publisher must never fail
//! the operation that produced the notification.

use tokio::sync::broadcast;
use tracing::debug;

use parley_core::events::Notification;

/// Consumes notification instructions produced by the fan-out.
pub trait Publisher: Send + Sync {
    fn publish(&self, notification: &Notification);
}

/// Publisher backed by a `tokio::sync::broadcast` channel.
///
/// In-process subscribers (an SSE bridge, a websocket hub, a test harness)
/// subscribe and filter by `notification.scope` themselves. Publishing with
/// no subscribers is a no-op, not an error.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastPublisher {
    /// Creates a publisher whose channel buffers up to `capacity`
    /// notifications per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Opens a new subscription to all future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Publisher for BroadcastPublisher {
    fn publish(&self, notification: &Notification) {
        if self.tx.send(notification.clone()).is_err() {
            debug!(
                event = notification.event.event_name(),
                topic = %notification.scope.topic(),
                "Notification dropped: no subscribers"
            );
        }
    }
}

/// Publisher that discards everything. For embeddings without delivery and
/// for tests that only exercise state.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&self, _notification: &Notification) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::events::{ConversationEvent, Scope};
    use parley_core::types::{ConversationId, CustomerId, Message};

    fn sample_notification() -> Notification {
        Notification::new(
            Scope::Agents,
            ConversationEvent::NewMessage {
                conversation_id: ConversationId::from_counter(1),
                message: Message::customer("Hola", "Hello"),
            },
        )
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = BroadcastPublisher::new(8);
        publisher.publish(&sample_notification());
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_notification() {
        let publisher = BroadcastPublisher::new(8);
        let mut rx = publisher.subscribe();

        publisher.publish(&sample_notification());

        let received = rx.recv().await.expect("notification");
        assert_eq!(received.scope, Scope::Agents);
        assert_eq!(received.event.event_name(), "new_message");
    }

    #[tokio::test]
    async fn test_all_subscribers_receive_each_notification() {
        let publisher = BroadcastPublisher::new(8);
        let mut rx1 = publisher.subscribe();
        let mut rx2 = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        publisher.publish(&sample_notification());

        assert_eq!(rx1.recv().await.unwrap().event.event_name(), "new_message");
        assert_eq!(rx2.recv().await.unwrap().event.event_name(), "new_message");
    }

    #[test]
    fn test_null_publisher_discards() {
        let publisher = NullPublisher;
        publisher.publish(&sample_notification());
    }
}
