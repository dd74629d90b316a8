//! Broadcast hub for server-to-client push.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{Clip, FileRecord};

/// Event pushed to every connected WebSocket client.
///
/// Serializes as `{"event": "new_clip", "data": {...}}` with the full
/// persisted record as the payload.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    NewClip(Clip),
    NewFile(FileRecord),
}

/// Fan-out channel all WebSocket sessions subscribe to.
#[derive(Clone, Debug)]
pub struct EventHub {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// New receiver for a WebSocket session.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Sends `event` to every live subscriber and returns how many received
    /// it. Having no subscribers is not an error.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        match self.tx.send(event) {
            Ok(subscriber_count) => {
                tracing::info!(
                    "[Realtime] Event broadcast to {} subscribers",
                    subscriber_count
                );
                subscriber_count
            }
            Err(e) => {
                tracing::debug!("[Realtime] No subscribers to receive event: {:?}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_clip() -> Clip {
        Clip {
            id: 7,
            content: "hello".into(),
            tag: "General".into(),
            username: "alice".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_envelope_shape() {
        let event = ServerEvent::NewClip(sample_clip());
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event"], "new_clip");
        assert_eq!(value["data"]["content"], "hello");
        assert_eq!(value["data"]["username"], "alice");
        assert!(value["data"]["createdAt"].is_string());
    }

    #[test]
    fn test_file_event_uses_camel_case_payload() {
        let event = ServerEvent::NewFile(FileRecord {
            id: 3,
            filename: "1700000000000-a.txt".into(),
            original_name: "a.txt".into(),
            size: 10,
            username: "bob".into(),
            created_at: Utc::now(),
        });
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event"], "new_file");
        assert_eq!(value["data"]["originalName"], "a.txt");
        assert_eq!(value["data"]["size"], 10);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_swallowed() {
        let hub = EventHub::new(8);
        assert_eq!(hub.broadcast(ServerEvent::NewClip(sample_clip())), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let hub = EventHub::new(8);
        let mut rx = hub.subscribe();

        assert_eq!(hub.broadcast(ServerEvent::NewClip(sample_clip())), 1);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ServerEvent::NewClip(c) if c.content == "hello"));
    }
}
