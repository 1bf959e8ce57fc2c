//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the auth bridge
//! (publisher) and the catalog/profile views (subscribers).

use chrono::{DateTime, Utc};
use dorama_core::session::AuthUser;
use dorama_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something subscribers need to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// The session changed: sign-in, sign-out, sign-up with an immediate
    /// session, or expiry. `user` is the user now in effect.
    AuthStateChanged { user: Option<AuthUser> },

    /// A review was added to a drama; detail views showing it should reload.
    ReviewsChanged { drama_id: DbId },
}

impl AppEvent {
    /// Dot-separated name, used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthStateChanged { .. } => "auth.state_changed",
            Self::ReviewsChanged { .. } => "reviews.changed",
        }
    }
}

/// An event plus the time it was published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: AppEvent,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use dorama_events::bus::{AppEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(AppEvent::AuthStateChanged { user: None });
/// ```
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: AppEvent) {
        tracing::debug!(event = event.name(), "Publishing event");
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(EventEnvelope {
            event,
            timestamp: Utc::now(),
        });
    }

    /// Subscribe to every event published from now on. Drop the receiver to
    /// unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(AppEvent::ReviewsChanged { drama_id: 42 });

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event, AppEvent::ReviewsChanged { drama_id: 42 });
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(AppEvent::AuthStateChanged { user: None });

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event, e2.event);
    }

    #[test]
    fn dropping_receiver_unsubscribes() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(AppEvent::AuthStateChanged { user: None });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(AppEvent::ReviewsChanged { drama_id: 3 }).unwrap();
        assert_eq!(json["type"], "reviews_changed");
        assert_eq!(json["drama_id"], 3);
    }
}
