//! Event types for the PDFDesk event system
//!
//! The controller never talks to the rendering layer directly. State changes
//! and user-facing alerts are broadcast as [`UiEvent`]s on an [`EventBus`];
//! a renderer (or the command-line front end) subscribes and reacts.

use crate::models::{QaPhase, Record, RecordField, RecordId, SelectionFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// PDFDesk UI event types
///
/// Events can be serialized for forwarding to a browser over SSE or a socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// The whole collection was replaced by a (re)fetch
    RecordsReplaced {
        filter: SelectionFilter,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A record was edited locally (optimistic, before remote confirmation)
    RecordUpdated {
        record: Record,
        field: RecordField,
        timestamp: DateTime<Utc>,
    },

    /// A newly uploaded record was appended
    RecordAppended {
        record: Record,
        timestamp: DateTime<Utc>,
    },

    /// A record was removed after the remote confirmed deletion
    RecordRemoved {
        id: RecordId,
        timestamp: DateTime<Utc>,
    },

    /// A coalesced write reached the remote store
    WriteSynced {
        id: RecordId,
        timestamp: DateTime<Utc>,
    },

    /// A coalesced write failed; the local edit is kept
    ///
    /// Local and remote state for `id` may now disagree.
    WriteFailed {
        id: RecordId,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Q&A state machine moved between phases
    QaPhaseChanged {
        old_phase: QaPhase,
        new_phase: QaPhase,
        timestamp: DateTime<Utc>,
    },

    /// Q&A produced an answer
    QaAnswered {
        record_id: RecordId,
        answer: String,
        timestamp: DateTime<Utc>,
    },

    /// User-visible alert
    Alert {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl UiEvent {
    /// Build an `Alert` stamped with the current time
    pub fn alert(message: impl Into<String>) -> Self {
        UiEvent::Alert {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Event type name, as used in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            UiEvent::RecordsReplaced { .. } => "RecordsReplaced",
            UiEvent::RecordUpdated { .. } => "RecordUpdated",
            UiEvent::RecordAppended { .. } => "RecordAppended",
            UiEvent::RecordRemoved { .. } => "RecordRemoved",
            UiEvent::WriteSynced { .. } => "WriteSynced",
            UiEvent::WriteFailed { .. } => "WriteFailed",
            UiEvent::QaPhaseChanged { .. } => "QaPhaseChanged",
            UiEvent::QaAnswered { .. } => "QaAnswered",
            UiEvent::Alert { .. } => "Alert",
        }
    }
}

/// Broadcast bus for [`UiEvent`]s
///
/// Cheap to share behind an `Arc`. Slow subscribers lose the oldest events
/// once `capacity` is exceeded.
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfdesk_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: UiEvent) -> Result<usize, broadcast::error::SendError<UiEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }

    /// Emit a user-visible alert
    ///
    /// Alerts are the only channel failures have to reach the user, so an
    /// alert nobody hears is logged.
    pub fn alert(&self, message: impl Into<String>) {
        let event = UiEvent::alert(message);
        if let Err(broadcast::error::SendError(UiEvent::Alert { message, .. })) = self.emit(event) {
            tracing::warn!(%message, "Alert raised with no subscribers");
        }
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
