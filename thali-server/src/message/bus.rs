//! Message bus
//!
//! A single broadcast channel. Publishing never blocks; a subscriber that
//! falls behind by more than the channel capacity skips messages and must
//! resync (order events carry `sequence`, so clients can detect the gap).

use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default broadcast capacity
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct MessageBus {
    server_tx: broadcast::Sender<BusMessage>,
    shutdown_token: CancellationToken,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            server_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Publish to every subscriber; returns how many received it
    pub fn publish(&self, msg: BusMessage) -> usize {
        match self.server_tx.send(msg) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!("No subscribers, message dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.server_tx.receiver_count()
    }

    /// Cancelled on shutdown; long-lived streams select on it
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{NotificationLevel, NotificationPayload};

    fn notice(title: &str) -> BusMessage {
        BusMessage::notification(
            Some(10),
            &NotificationPayload {
                level: NotificationLevel::Info,
                title: title.into(),
                message: String::new(),
            },
        )
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let bus = MessageBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.publish(notice("hello")), 2);

        let got_a: NotificationPayload = a.recv().await.unwrap().parse_payload().unwrap();
        let got_b: NotificationPayload = b.recv().await.unwrap().parse_payload().unwrap();
        assert_eq!(got_a.title, "hello");
        assert_eq!(got_b.title, "hello");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = MessageBus::new();
        assert_eq!(bus.publish(notice("nobody")), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let bus = MessageBus::with_capacity(2);
        let mut rx = bus.subscribe();
        for i in 0..4 {
            bus.publish(notice(&i.to_string()));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
    }
}
