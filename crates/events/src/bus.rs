//! Broadcast hub between the undo log and its listeners.
//!
//! Two families of events travel here: `notice.*` (toasts for the UI, see
//! [`Notice`](crate::Notice)) and `cache.*` (query cache generations, see
//! [`BusCacheInvalidator`](crate::BusCacheInvalidator)). Listeners filter by
//! [`BusEvent::family`].

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::broadcast;

/// Slots per receiver before a slow listener starts lagging.
const DEFAULT_CAPACITY: usize = 256;

/// One message on the bus.
#[derive(Debug, Clone)]
pub struct BusEvent {
    /// `family.name`, e.g. `notice.partial_restore`.
    pub topic: &'static str,
    pub payload: Value,
    pub emitted_at: DateTime<Utc>,
}

impl BusEvent {
    pub fn new(topic: &'static str, payload: Value) -> Self {
        Self {
            topic,
            payload,
            emitted_at: Utc::now(),
        }
    }

    /// The part of the topic before the first dot.
    pub fn family(&self) -> &'static str {
        self.topic
            .split_once('.')
            .map_or(self.topic, |(family, _)| family)
    }
}

/// Fan-out channel shared as `Arc<EventBus>`.
///
/// ```rust
/// use repertoire_events::{BusEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// assert_eq!(bus.publish(BusEvent::new("cache.invalidated", serde_json::json!({}))), 1);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send to every current listener and return how many there were.
    pub fn publish(&self, event: BusEvent) -> usize {
        match self.sender.send(event) {
            Ok(listeners) => listeners,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(topic = event.topic, "No bus listeners");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn family_is_the_topic_prefix() {
        assert_eq!(BusEvent::new("notice.replay_failed", json!({})).family(), "notice");
        assert_eq!(BusEvent::new("heartbeat", json!({})).family(), "heartbeat");
    }

    #[tokio::test]
    async fn every_listener_sees_a_cache_announcement() {
        let bus = EventBus::default();
        let mut feed = bus.subscribe();
        let mut relay = bus.subscribe();
        assert_eq!(bus.listener_count(), 2);

        let delivered = bus.publish(BusEvent::new("cache.invalidated", json!({"generation": 3})));
        assert_eq!(delivered, 2);

        for rx in [&mut feed, &mut relay] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.topic, "cache.invalidated");
            assert_eq!(event.payload["generation"], 3);
        }
    }

    #[test]
    fn publishing_without_listeners_reports_zero() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(BusEvent::new("notice.action_recorded", json!({}))), 0);
    }

    #[tokio::test]
    async fn dropped_receiver_no_longer_counts() {
        let bus = EventBus::with_capacity(4);
        let rx = bus.subscribe();
        drop(rx);
        assert_eq!(bus.listener_count(), 0);
    }
}
