//! Post-commit events
//!
//! Sinks are notified after a transaction committed. A failing sink never
//! affects the committed signature.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::schemas::{BordereauId, Status};

/// Event emitted for every document written by a committed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BordereauEvent {
    StatusChanged {
        id: BordereauId,
        previous: Status,
        status: Status,
    },
}

impl BordereauEvent {
    pub fn id(&self) -> &BordereauId {
        match self {
            BordereauEvent::StatusChanged { id, .. } => id,
        }
    }
}

/// Receiver of post-commit events (notifications, PDF rendering, indexing)
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &BordereauEvent);
}

/// Sink writing every event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn publish(&self, event: &BordereauEvent) {
        match event {
            BordereauEvent::StatusChanged {
                id,
                previous,
                status,
            } => info!(%id, %previous, %status, "status changed"),
        }
    }
}

/// Sink forwarding events to an async consumer
///
/// This is the hook for embedders that react to status changes (the CLI
/// uses it to report documents touched by a cascade). Delivery happens after
/// commit and never blocks the engine.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: UnboundedSender<BordereauEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: UnboundedSender<BordereauEvent>) -> Self {
        ChannelEventSink { sender }
    }

    /// Create a sink together with the receiving end of its channel
    pub fn channel() -> (Self, UnboundedReceiver<BordereauEvent>) {
        let (sender, receiver) = unbounded_channel();
        (ChannelEventSink::new(sender), receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn publish(&self, event: &BordereauEvent) {
        if let Err(err) = self.sender.send(event.clone()) {
            warn!(id = %event.id(), error = %err, "event consumer is gone, dropping event");
        }
    }
}

/// Sink keeping every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<BordereauEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BordereauEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: &BordereauEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
