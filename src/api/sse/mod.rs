//! SSE (Server-Sent Events) module for live queue displays
//!
//! `GET /api/events` streams the same events as the WebSocket endpoint for
//! clients that only need to listen. The SSE `id` field carries the
//! sequence id.

pub mod handler;

use serde::Serialize;

use crate::broadcast::{QueueMessage, Snapshot};

/// SSE event payloads; the variant travels in the `event:` field
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SseEvent {
    /// Every ticket at connect time
    Snapshot {
        #[serde(flatten)]
        snapshot: Snapshot,
    },
    /// A broadcast queue event, serialized exactly as on the WebSocket
    QueueEvent {
        #[serde(flatten)]
        message: QueueMessage,
    },
    /// Stream is ending
    Error { code: String, message: String },
}

impl SseEvent {
    /// SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            SseEvent::Snapshot { .. } => "snapshot",
            SseEvent::QueueEvent { .. } => "queue_event",
            SseEvent::Error { .. } => "error",
        }
    }
}

pub use handler::sse_handler;
