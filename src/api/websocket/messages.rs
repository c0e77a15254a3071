//! Messages exchanged over the WebSocket connection

use serde::{Deserialize, Serialize};

use crate::broadcast::{EventKind, Snapshot};

/// Messages the client can send
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving the given event kinds
    Subscribe { kinds: Vec<EventKind> },
    /// Stop receiving the given event kinds
    Unsubscribe { kinds: Vec<EventKind> },
    /// Application-level ping
    Ping,
}

/// Messages the server sends besides queue events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect; events follow from `sequenceId`
    Snapshot {
        #[serde(flatten)]
        snapshot: Snapshot,
    },
    /// Current subscription after a subscribe/unsubscribe request
    Subscribed { kinds: Vec<EventKind> },
    Pong { timestamp: i64 },
    Error { code: String, message: String },
}

impl ServerMessage {
    pub fn pong() -> Self {
        ServerMessage::Pong {
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
