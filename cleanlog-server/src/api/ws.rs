//! WebSocket update broadcaster
//!
//! Each connected client gets `{"type":"update","data":"New data available"}`
//! on a fixed interval, and immediately whenever a cleaning record or
//! shift-end is created. Messages carry no delta; clients refetch.
//!
//! Session lifecycle: Connected -> (Send)* -> Disconnected. Send failures are
//! ignored; the session ends when the client closes or the socket errors.

use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use cleanlog_common::CleanlogEvent;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// The single server-to-client message
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: &'static str,
}

impl UpdateMessage {
    pub const UPDATE: UpdateMessage = UpdateMessage {
        kind: "update",
        data: "New data available",
    };

    pub fn to_json(&self) -> String {
        // Two static string fields cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    start_session(ws, &state)
}

/// Complete the upgrade and run a session on the new socket
pub fn start_session(ws: WebSocketUpgrade, state: &AppState) -> Response {
    let bus = state.events.clone();
    let events = bus.subscribe();
    let period = state.ws_interval;

    ws.on_upgrade(move |socket: WebSocket| async move {
        info!("Client connected ({} sessions)", bus.subscriber_count());
        let (sender, receiver) = socket.split();
        run_session(sender, receiver, events, period).await;
        info!("Client disconnected");
    })
}

/// Drive one client until it disconnects
pub async fn run_session<Tx, Rx, E>(
    mut sender: Tx,
    mut receiver: Rx,
    mut events: broadcast::Receiver<CleanlogEvent>,
    period: Duration,
) where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    let payload = UpdateMessage::UPDATE.to_json();

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut events_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                send_best_effort(&mut sender, &payload).await;
            }

            event = events.recv(), if events_open => match event {
                Ok(event) => {
                    debug!("Forwarding {} to client", event.event_type());
                    send_best_effort(&mut sender, &payload).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Client lagged by {} events", skipped);
                    send_best_effort(&mut sender, &payload).await;
                }
                Err(RecvError::Closed) => events_open = false,
            },

            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => info!("Received: {}", text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            },
        }
    }
}

async fn send_best_effort<Tx>(sender: &mut Tx, payload: &str)
where
    Tx: Sink<Message> + Unpin,
{
    if sender.send(Message::Text(payload.to_string())).await.is_err() {
        debug!("Dropped update for disconnected client");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cleanlog_common::EventBus;
    use futures::channel::mpsc;

    type Inbound = Result<Message, axum::Error>;

    fn text_of(message: Message) -> String {
        match message {
            Message::Text(text) => text,
            other => panic!("expected text message, got {:?}", other),
        }
    }

    #[test]
    fn test_update_message_format() {
        let json: serde_json::Value = serde_json::from_str(&UpdateMessage::UPDATE.to_json()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "update", "data": "New data available"}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_update_and_event_push() {
        let bus = EventBus::new(16);
        let (out_tx, mut out_rx) = mpsc::unbounded::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded::<Inbound>();

        let session = tokio::spawn(run_session(out_tx, in_rx, bus.subscribe(), Duration::from_secs(10)));

        // Paused clock auto-advances to the first tick
        let first = out_rx.next().await.unwrap();
        assert_eq!(text_of(first), UpdateMessage::UPDATE.to_json());

        bus.emit_lossy(CleanlogEvent::ShiftEnded {
            id: 1,
            cleaner_name: "Ali".to_string(),
            timestamp: Utc::now(),
        });
        let pushed = out_rx.next().await.unwrap();
        assert_eq!(text_of(pushed), UpdateMessage::UPDATE.to_json());

        drop(in_tx);
        session.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_frame_ends_session() {
        let bus = EventBus::new(16);
        let (out_tx, _out_rx) = mpsc::unbounded::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded::<Inbound>();

        let session = tokio::spawn(run_session(out_tx, in_rx, bus.subscribe(), Duration::from_secs(10)));

        in_tx.unbounded_send(Ok(Message::Text("hello".to_string()))).unwrap();
        in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();

        session.await.unwrap();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_is_ignored() {
        let bus = EventBus::new(16);
        let (out_tx, out_rx) = mpsc::unbounded::<Message>();
        drop(out_rx);
        let (in_tx, in_rx) = mpsc::unbounded::<Inbound>();

        let session = tokio::spawn(run_session(out_tx, in_rx, bus.subscribe(), Duration::from_secs(10)));

        // Several ticks elapse against a dead sender without ending the session
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert!(!session.is_finished());

        drop(in_tx);
        session.await.unwrap();
    }
}
