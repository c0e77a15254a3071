//! Ticket types for the visitor queue

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned ticket identifier
pub type TicketId = u64;

/// A visitor's membership in the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "scheduleAppointment", default)]
    pub schedule_appointment: bool,
    #[serde(rename = "firstTimeVisitor", default)]
    pub first_time_visitor: bool,
    /// Insertion time, truncated to the minute. Older rows call this `time`.
    #[serde(rename = "createdAt", alias = "time")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "positionInLine")]
    pub position_in_line: u64,
    #[serde(
        rename = "additionalNotes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(
        rename = "scheduledAppointmentTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_appointment_time: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Build a stored ticket from a draft and its assigned id
    pub fn from_draft(id: TicketId, draft: TicketDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            schedule_appointment: draft.schedule_appointment,
            first_time_visitor: draft.first_time_visitor,
            created_at: draft.created_at,
            position_in_line: draft.position_in_line,
            additional_notes: draft.additional_notes,
            done: draft.done,
            scheduled_appointment_time: draft.scheduled_appointment_time,
        }
    }

    /// A ticket is active until it is marked done
    pub fn is_active(&self) -> bool {
        !self.done
    }

    /// Whether the ticket was created inside the trailing `window` ending at `now`
    ///
    /// A window reaching past the earliest representable time covers everything.
    pub fn is_current(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.checked_sub_signed(window)
            .map_or(true, |start| self.created_at >= start)
    }
}

/// A ticket ready for insertion; everything but the id is decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub first_name: String,
    pub last_name: String,
    pub schedule_appointment: bool,
    pub first_time_visitor: bool,
    pub created_at: DateTime<Utc>,
    pub position_in_line: u64,
    pub additional_notes: Option<String>,
    pub done: bool,
    pub scheduled_appointment_time: Option<DateTime<Utc>>,
}

/// Client request to create a ticket
///
/// `id`, `createdAt` and `positionInLine` are assigned by the server, so
/// they are not part of this shape and are ignored if a client sends them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTicket {
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(rename = "scheduleAppointment", default)]
    pub schedule_appointment: bool,
    #[serde(rename = "firstTimeVisitor", default)]
    pub first_time_visitor: bool,
    #[serde(
        rename = "additionalNotes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(
        rename = "scheduledAppointmentTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_appointment_time: Option<DateTime<Utc>>,
}

impl NewTicket {
    /// Create a walk-in request
    pub fn walk_in(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    /// Create a request with a booked appointment time
    pub fn with_appointment(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            schedule_appointment: true,
            scheduled_appointment_time: Some(at),
            ..Default::default()
        }
    }

    /// Turn the request into a draft with server-assigned fields
    pub fn into_draft(self, created_at: DateTime<Utc>, position_in_line: u64) -> TicketDraft {
        TicketDraft {
            first_name: self.first_name,
            last_name: self.last_name,
            schedule_appointment: self.schedule_appointment,
            first_time_visitor: self.first_time_visitor,
            created_at,
            position_in_line,
            additional_notes: self.additional_notes,
            done: self.done,
            scheduled_appointment_time: self.scheduled_appointment_time,
        }
    }
}

/// Partial update of a ticket's mutable fields
///
/// For the nullable fields, an absent key leaves the value alone while an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdate {
    #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(
        rename = "scheduleAppointment",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule_appointment: Option<bool>,
    #[serde(
        rename = "firstTimeVisitor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub first_time_visitor: Option<bool>,
    #[serde(
        rename = "positionInLine",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub position_in_line: Option<u64>,
    #[serde(
        rename = "additionalNotes",
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(
        rename = "scheduledAppointmentTime",
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_appointment_time: Option<Option<DateTime<Utc>>>,
}

impl TicketUpdate {
    /// Update that only marks the ticket as served
    pub fn mark_done() -> Self {
        Self {
            done: Some(true),
            ..Default::default()
        }
    }

    /// True when the update would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the present fields to `ticket`; `id` and `createdAt` never change
    pub fn apply_to(&self, ticket: &mut Ticket) {
        if let Some(ref first_name) = self.first_name {
            ticket.first_name = first_name.clone();
        }
        if let Some(ref last_name) = self.last_name {
            ticket.last_name = last_name.clone();
        }
        if let Some(schedule_appointment) = self.schedule_appointment {
            ticket.schedule_appointment = schedule_appointment;
        }
        if let Some(first_time_visitor) = self.first_time_visitor {
            ticket.first_time_visitor = first_time_visitor;
        }
        if let Some(position) = self.position_in_line {
            ticket.position_in_line = position;
        }
        if let Some(ref notes) = self.additional_notes {
            ticket.additional_notes = notes.clone();
        }
        if let Some(done) = self.done {
            ticket.done = done;
        }
        if let Some(at) = self.scheduled_appointment_time {
            ticket.scheduled_appointment_time = at;
        }
    }
}

/// Deserialize a present key (even `null`) as `Some(..)`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
