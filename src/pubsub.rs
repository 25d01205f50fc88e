use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;
use uuid::Uuid;

/// Each subscriber has room for a single pending message. A publisher never waits: when the slot
/// is taken, that subscriber misses the message.
const SUBSCRIBER_CAPACITY: usize = 1;

/// Channel registry for publish/subscribe.
///
/// The broker has its own lock, independent of the store, so publishing never waits on data
/// commands. Channel entries are created on first subscribe and kept around afterwards, even when
/// their last subscriber leaves.
#[derive(Clone, Default)]
pub struct Broker {
    channels: Arc<RwLock<HashMap<String, Vec<Endpoint>>>>,
}

struct Endpoint {
    id: Uuid,
    sender: mpsc::Sender<Bytes>,
}

/// The receiving side of one subscription.
#[derive(Debug)]
pub struct Subscriber {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<Bytes>,
}

impl Broker {
    pub fn new() -> Broker {
        Broker::default()
    }

    pub fn subscribe(&self, channel: &str) -> Subscriber {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
        let id = Uuid::new_v4();

        self.channels
            .write()
            .entry(channel.to_string())
            .or_default()
            .push(Endpoint { id, sender });

        debug!(channel, %id, "subscribed");
        Subscriber { id, receiver }
    }

    /// Removes the subscriber from the channel. Dropping its sender ends the subscriber's stream.
    pub fn unsubscribe(&self, channel: &str, id: Uuid) {
        if let Some(endpoints) = self.channels.write().get_mut(channel) {
            endpoints.retain(|endpoint| endpoint.id != id);
            debug!(channel, %id, "unsubscribed");
        }
    }

    /// Offers `message` to every subscriber of `channel` and returns how many accepted it.
    pub fn publish(&self, channel: &str, message: Bytes) -> usize {
        let channels = self.channels.read();
        let Some(endpoints) = channels.get(channel) else {
            return 0;
        };

        endpoints
            .iter()
            .filter(|endpoint| match endpoint.sender.try_send(message.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    debug!(channel, id = %endpoint.id, "subscriber busy, message dropped");
                    false
                }
                Err(TrySendError::Closed(_)) => false,
            })
            .count()
    }

    pub fn subscribers(&self, channel: &str) -> usize {
        self.channels.read().get(channel).map_or(0, Vec::len)
    }

    pub fn channels(&self) -> usize {
        self.channels.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_to_unknown_channel() {
        let broker = Broker::new();

        assert_eq!(broker.publish("news", Bytes::from("hello")), 0);
        assert_eq!(broker.channels(), 0);
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let broker = Broker::new();
        let mut first = broker.subscribe("news");
        let mut second = broker.subscribe("news");

        assert_eq!(broker.publish("news", Bytes::from("hello")), 2);

        assert_eq!(first.receiver.recv().await, Some(Bytes::from("hello")));
        assert_eq!(second.receiver.recv().await, Some(Bytes::from("hello")));
    }

    #[tokio::test]
    async fn full_subscriber_misses_messages() {
        let broker = Broker::new();
        let mut slow = broker.subscribe("news");

        assert_eq!(broker.publish("news", Bytes::from("one")), 1);
        assert_eq!(broker.publish("news", Bytes::from("two")), 0);

        assert_eq!(slow.receiver.recv().await, Some(Bytes::from("one")));
        assert_eq!(broker.publish("news", Bytes::from("three")), 1);
        assert_eq!(slow.receiver.recv().await, Some(Bytes::from("three")));
    }

    #[tokio::test]
    async fn unsubscribe_closes_the_stream() {
        let broker = Broker::new();
        let mut subscriber = broker.subscribe("news");

        broker.unsubscribe("news", subscriber.id);

        assert_eq!(broker.publish("news", Bytes::from("hello")), 0);
        assert_eq!(subscriber.receiver.recv().await, None);
        // The channel entry itself stays.
        assert_eq!(broker.channels(), 1);
        assert_eq!(broker.subscribers("news"), 0);
    }
}
