//! Event types pushed to live queue displays

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Ticket;

/// What happened to a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Independent event streams a subscriber can listen to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Ticket created, updated or deleted
    Changes,
    /// Liveness / "please refresh" pings
    Refresh,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Changes => "changes",
            EventKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "changes" | "change" | "tickets" => Ok(EventKind::Changes),
            "refresh" | "ping" => Ok(EventKind::Refresh),
            other => Err(format!("unknown event kind '{}'", other)),
        }
    }
}

/// Set of event kinds a subscriber receives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventKinds {
    changes: bool,
    refresh: bool,
}

impl EventKinds {
    pub fn all() -> Self {
        Self {
            changes: true,
            refresh: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn only(kind: EventKind) -> Self {
        let mut kinds = Self::none();
        kinds.insert(kind);
        kinds
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Changes => self.changes,
            EventKind::Refresh => self.refresh,
        }
    }

    pub fn insert(&mut self, kind: EventKind) {
        match kind {
            EventKind::Changes => self.changes = true,
            EventKind::Refresh => self.refresh = true,
        }
    }

    pub fn remove(&mut self, kind: EventKind) {
        match kind {
            EventKind::Changes => self.changes = false,
            EventKind::Refresh => self.refresh = false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.changes && !self.refresh
    }

    /// Parse a comma separated list such as `changes,refresh`
    pub fn parse_list(list: &str) -> Result<Self, String> {
        let mut kinds = Self::none();
        for part in list.split(',').filter(|p| !p.trim().is_empty()) {
            kinds.insert(part.parse()?);
        }
        Ok(kinds)
    }
}

/// Queue events broadcast to subscribers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A ticket was created, updated or deleted. Carries the full ticket.
    TicketChanged {
        change: ChangeKind,
        ticket: Ticket,
        /// Session tag of the client that made the change
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<String>,
    },

    /// Ask displays to refresh; also used as a heartbeat
    Refresh {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl QueueEvent {
    pub fn ticket_changed(change: ChangeKind, ticket: Ticket, origin: Option<String>) -> Self {
        QueueEvent::TicketChanged {
            change,
            ticket,
            origin,
        }
    }

    pub fn refresh(reason: Option<String>) -> Self {
        QueueEvent::Refresh { reason }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            QueueEvent::TicketChanged { .. } => EventKind::Changes,
            QueueEvent::Refresh { .. } => EventKind::Refresh,
        }
    }

    pub fn origin(&self) -> Option<&str> {
        match self {
            QueueEvent::TicketChanged { origin, .. } => origin.as_deref(),
            QueueEvent::Refresh { .. } => None,
        }
    }
}

/// Broadcast envelope with ordering metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    #[serde(flatten)]
    pub event: QueueEvent,

    /// Global publish order, for gap detection
    #[serde(rename = "sequenceId")]
    pub sequence_id: u64,

    /// Unix timestamp when the event was published
    pub timestamp: i64,
}

impl QueueMessage {
    /// Whether a subscriber tagged `session` caused this event
    pub fn is_echo_for(&self, session: Option<&str>) -> bool {
        match (session, self.event.origin()) {
            (Some(session), Some(origin)) => session == origin,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewTicket;
    use crate::utils::current_minute;

    fn ticket() -> Ticket {
        Ticket::from_draft(3, NewTicket::walk_in("Alan", "Turing").into_draft(current_minute(), 4))
    }

    #[test]
    fn test_ticket_changed_serialization() {
        let msg = QueueMessage {
            event: QueueEvent::ticket_changed(ChangeKind::Updated, ticket(), Some("desk-2".into())),
            sequence_id: 42,
            timestamp: 1_700_000_000,
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ticket_changed");
        assert_eq!(json["change"], "updated");
        assert_eq!(json["ticket"]["firstName"], "Alan");
        assert_eq!(json["origin"], "desk-2");
        assert_eq!(json["sequenceId"], 42);

        let back: QueueMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_refresh_serialization_omits_empty_reason() {
        let json = serde_json::to_string(&QueueEvent::refresh(None)).unwrap();
        assert_eq!(json, r#"{"type":"refresh"}"#);
    }

    #[test]
    fn test_event_kinds_parse_list() {
        let kinds = EventKinds::parse_list("changes, refresh").unwrap();
        assert_eq!(kinds, EventKinds::all());

        let kinds = EventKinds::parse_list("refresh").unwrap();
        assert!(kinds.contains(EventKind::Refresh));
        assert!(!kinds.contains(EventKind::Changes));

        assert!(EventKinds::parse_list("").unwrap().is_empty());
        assert!(EventKinds::parse_list("bogus").is_err());
    }

    #[test]
    fn test_echo_detection() {
        let msg = QueueMessage {
            event: QueueEvent::ticket_changed(ChangeKind::Created, ticket(), Some("me".into())),
            sequence_id: 0,
            timestamp: 0,
        };
        assert!(msg.is_echo_for(Some("me")));
        assert!(!msg.is_echo_for(Some("you")));
        assert!(!msg.is_echo_for(None));
    }
}
