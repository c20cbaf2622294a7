//! WebSocket endpoints.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::StreamExt;
use moneypot_core::{AccountId, Event, EventKind};
use moneypot_state::SubscriptionFilter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Query parameters narrowing an event stream.
#[derive(Debug, Default, Deserialize)]
pub struct EventStreamQuery {
    pub kind: Option<EventKind>,
    pub subject: Option<u64>,
    pub actor: Option<String>,
}

impl EventStreamQuery {
    fn into_filter(self) -> SubscriptionFilter {
        SubscriptionFilter {
            kinds: self.kind.map(|kind| vec![kind]),
            subject_id: self.subject,
            actor: self.actor.map(AccountId::new),
        }
    }
}

/// WebSocket message for the event stream.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventStreamMessage {
    /// Sent once after the subscription is registered.
    Connected { subscription_id: Uuid },
    /// A committed event matching the filter.
    Event { event: Event },
}

/// Live stream of committed events.
pub async fn event_stream(
    ws: WebSocketUpgrade,
    Query(query): Query<EventStreamQuery>,
    State(state): State<AppState>,
) -> Response {
    let filter = query.into_filter();
    ws.on_upgrade(move |socket| handle_event_stream(socket, filter, state))
}

async fn handle_event_stream(mut socket: WebSocket, filter: SubscriptionFilter, state: AppState) {
    let subscription = state.bus.subscribe(filter);
    let id = subscription.id;
    let mut events = Box::pin(subscription.into_stream());
    debug!(subscription = %id, "event stream opened");

    if deliver(&mut socket, &EventStreamMessage::Connected { subscription_id: id }).await {
        loop {
            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else { break };
                    if !deliver(&mut socket, &EventStreamMessage::Event { event }).await {
                        break;
                    }
                }
                msg = socket.recv() => {
                    match incoming(msg) {
                        Incoming::Closed => break,
                        Incoming::Reply(reply) => {
                            if socket.send(reply).await.is_err() {
                                break;
                            }
                        }
                        Incoming::Ignore => {}
                    }
                }
            }
        }
    }

    debug!(subscription = %id, "event stream closed");
}

/// What the stream loop should do with a frame from the client.
#[derive(Debug, PartialEq)]
enum Incoming {
    Closed,
    Reply(Message),
    Ignore,
}

fn incoming(msg: Option<Result<Message, axum::Error>>) -> Incoming {
    match msg {
        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => Incoming::Closed,
        Some(Ok(Message::Ping(data))) => Incoming::Reply(Message::Pong(data)),
        Some(Ok(_)) => Incoming::Ignore,
    }
}

/// Send a message, returning whether the socket is still usable.
async fn deliver(socket: &mut WebSocket, message: &EventStreamMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "failed to encode stream message");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_into_filter() {
        let query: EventStreamQuery =
            serde_json::from_str(r#"{"kind": "solved", "subject": 3}"#).unwrap();
        let filter = query.into_filter();

        assert_eq!(filter.kinds, Some(vec![EventKind::Solved]));
        assert_eq!(filter.subject_id, Some(3));
        assert!(filter.actor.is_none());
    }

    #[test]
    fn test_incoming_frames() {
        assert_eq!(incoming(None), Incoming::Closed);
        assert_eq!(incoming(Some(Ok(Message::Close(None)))), Incoming::Closed);
        assert_eq!(
            incoming(Some(Err(axum::Error::new("connection reset")))),
            Incoming::Closed
        );
        assert_eq!(
            incoming(Some(Ok(Message::Ping(vec![1, 2])))),
            Incoming::Reply(Message::Pong(vec![1, 2]))
        );
        assert_eq!(
            incoming(Some(Ok(Message::Text("hello".to_string())))),
            Incoming::Ignore
        );
    }

    #[test]
    fn test_message_encoding() {
        let event = Event::new(EventKind::Created, 0, 5, AccountId::new("alice"));
        let json = serde_json::to_value(EventStreamMessage::Event { event }).unwrap();

        assert_eq!(json["type"], "event");
        assert_eq!(json["event"]["kind"], "created");
        assert_eq!(json["event"]["actor"], "alice");
    }
}
