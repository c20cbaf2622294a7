//! Live subscriptions to committed events.

use futures::{future, Stream, StreamExt};
use moneypot_core::{AccountId, Event, EventKind};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;
use uuid::Uuid;

/// Filter for subscriptions. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    /// Event kinds to watch.
    pub kinds: Option<Vec<EventKind>>,

    /// Pot or attempt id to watch.
    pub subject_id: Option<u64>,

    /// Only events committed by this caller.
    pub actor: Option<AccountId>,
}

impl SubscriptionFilter {
    /// Create a filter for specific kinds.
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            kinds: Some(kinds),
            ..Default::default()
        }
    }

    /// Create a filter for one subject id.
    pub fn subject(subject_id: u64) -> Self {
        Self {
            subject_id: Some(subject_id),
            ..Default::default()
        }
    }

    /// Check if an event matches this filter.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }

        if let Some(subject_id) = self.subject_id {
            if event.subject_id != subject_id {
                return false;
            }
        }

        if let Some(ref actor) = self.actor {
            if event.actor != *actor {
                return false;
            }
        }

        true
    }
}

/// A subscription to committed events.
pub struct EventSubscription {
    /// Unique ID for this subscription.
    pub id: Uuid,

    /// Filter for this subscription.
    pub filter: SubscriptionFilter,

    receiver: broadcast::Receiver<Event>,
}

impl EventSubscription {
    /// Convert into a stream of matching events. Ends once the bus is gone.
    pub fn into_stream(self) -> impl Stream<Item = Event> + Send + 'static {
        let EventSubscription {
            id,
            filter,
            receiver,
        } = self;

        BroadcastStream::new(receiver).filter_map(move |item| {
            let event = match item {
                Ok(event) => Some(event).filter(|e| filter.matches(e)),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(subscription = %id, skipped, "subscriber lagged behind");
                    None
                }
            };
            future::ready(event)
        })
    }
}

/// Fan-out of committed events to subscribers.
///
/// Subscribers hold their own receivers; dropping a subscription or its
/// stream is all it takes to leave.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events with a filter.
    pub fn subscribe(&self, filter: SubscriptionFilter) -> EventSubscription {
        EventSubscription {
            id: Uuid::new_v4(),
            filter,
            receiver: self.sender.subscribe(),
        }
    }

    /// Publish a committed event. Having no subscribers is not an error.
    pub fn publish(&self, event: &Event) {
        let _ = self.sender.send(event.clone());
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, subject_id: u64) -> Event {
        Event::new(kind, subject_id, 0, AccountId::new("alice"))
    }

    #[test]
    fn test_filter_kinds() {
        let filter = SubscriptionFilter::kinds(vec![EventKind::Solved, EventKind::Expired]);

        assert!(filter.matches(&event(EventKind::Solved, 1)));
        assert!(!filter.matches(&event(EventKind::Attempted, 1)));
    }

    #[test]
    fn test_filter_subject_and_actor() {
        let mut filter = SubscriptionFilter::subject(7);
        assert!(filter.matches(&event(EventKind::Created, 7)));
        assert!(!filter.matches(&event(EventKind::Created, 8)));

        filter.actor = Some(AccountId::new("bob"));
        assert!(!filter.matches(&event(EventKind::Created, 7)));
    }

    #[tokio::test]
    async fn test_stream_yields_matching_events() {
        let bus = EventBus::new(16);
        let sub = bus.subscribe(SubscriptionFilter::kinds(vec![EventKind::Failed]));
        let mut stream = Box::pin(sub.into_stream());

        bus.publish(&event(EventKind::Attempted, 0));
        bus.publish(&event(EventKind::Failed, 0));

        let received = stream.next().await.unwrap();
        assert_eq!(received.kind, EventKind::Failed);
    }

    #[tokio::test]
    async fn test_stream_filters_by_subject() {
        let bus = EventBus::new(16);
        let mut stream = Box::pin(bus.subscribe(SubscriptionFilter::subject(2)).into_stream());

        bus.publish(&event(EventKind::Created, 1));
        bus.publish(&event(EventKind::Created, 2));

        let received = stream.next().await.unwrap();
        assert_eq!(received.subject_id, 2);
    }

    #[tokio::test]
    async fn test_stream_ends_with_bus() {
        let bus = EventBus::new(16);
        let mut stream = Box::pin(bus.subscribe(SubscriptionFilter::default()).into_stream());

        bus.publish(&event(EventKind::Created, 0));
        drop(bus);

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_gap() {
        let bus = EventBus::new(2);
        let mut stream = Box::pin(bus.subscribe(SubscriptionFilter::default()).into_stream());

        for subject in 0..5 {
            bus.publish(&event(EventKind::Created, subject));
        }

        // The three oldest were overwritten
        assert_eq!(stream.next().await.unwrap().subject_id, 3);
        assert_eq!(stream.next().await.unwrap().subject_id, 4);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        bus.publish(&event(EventKind::Created, 0));
    }
}
