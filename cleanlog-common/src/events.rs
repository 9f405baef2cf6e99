//! Event system for cleanlog
//!
//! Record-mutation events and the EventBus that distributes them to
//! WebSocket sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted when the Record Store accepts a new row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CleanlogEvent {
    /// A cleaning record was inserted
    CleaningRecorded {
        id: i64,
        cleaner_name: String,
        has_problem: bool,
        timestamp: DateTime<Utc>,
    },

    /// A cleaner marked their shift as finished
    ShiftEnded {
        id: i64,
        cleaner_name: String,
        timestamp: DateTime<Utc>,
    },
}

impl CleanlogEvent {
    /// Event name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            CleanlogEvent::CleaningRecorded { .. } => "CleaningRecorded",
            CleanlogEvent::ShiftEnded { .. } => "ShiftEnded",
        }
    }
}

/// Central distribution bus for record-mutation events
///
/// Wraps `tokio::sync::broadcast`:
/// - Publishing never blocks on slow subscribers
/// - Any number of WebSocket sessions may subscribe
/// - Subscribers that fall behind observe `Lagged` and skip ahead
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CleanlogEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<CleanlogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CleanlogEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
