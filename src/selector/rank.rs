//! Ranking keys used by the selector

use std::cmp::Reverse;

use chrono::{DateTime, Duration, Utc};

use crate::types::{Ticket, TicketId};

/// Priority of a ticket when choosing who to call next
///
/// Variant order is the priority order: every near appointment sorts ahead
/// of every queued ticket, and near appointments sort by distance to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServeRank {
    /// Appointment within the near window; carries `|appointment - now|`
    Near(Duration),
    /// Walk-ins and appointments outside the near window
    Queued,
}

impl ServeRank {
    pub fn of(ticket: &Ticket, now: DateTime<Utc>, near_window: Duration) -> Self {
        match ticket.scheduled_appointment_time {
            Some(at) => {
                let distance = if at >= now { at - now } else { now - at };
                if distance <= near_window {
                    ServeRank::Near(distance)
                } else {
                    ServeRank::Queued
                }
            }
            None => ServeRank::Queued,
        }
    }
}

/// Full sort key for serving order
pub(crate) fn serve_key(
    ticket: &Ticket,
    now: DateTime<Utc>,
    near_window: Duration,
) -> (ServeRank, u64, TicketId) {
    (
        ServeRank::of(ticket, now, near_window),
        ticket.position_in_line,
        ticket.id,
    )
}

/// Sort key for the scheduling view: newest slot first, then line order
pub(crate) fn schedule_key(ticket: &Ticket) -> (Reverse<DateTime<Utc>>, u64, TicketId) {
    let slot = ticket.scheduled_appointment_time.unwrap_or(ticket.created_at);
    (Reverse(slot), ticket.position_in_line, ticket.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewTicket;

    fn ticket_with(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Ticket {
        let mut request = NewTicket::walk_in("Test", "Visitor");
        request.schedule_appointment = at.is_some();
        request.scheduled_appointment_time = at;
        Ticket::from_draft(1, request.into_draft(now, 1))
    }

    #[test]
    fn test_near_sorts_before_queued() {
        let near = ServeRank::Near(Duration::minutes(29));
        assert!(near < ServeRank::Queued);
        assert!(ServeRank::Near(Duration::minutes(1)) < near);
    }

    #[test]
    fn test_rank_uses_absolute_distance() {
        let now = Utc::now();
        let window = Duration::minutes(30);

        let early = ticket_with(Some(now + Duration::minutes(10)), now);
        let late = ticket_with(Some(now - Duration::minutes(10)), now);
        assert_eq!(
            ServeRank::of(&early, now, window),
            ServeRank::of(&late, now, window)
        );
    }

    #[test]
    fn test_rank_outside_window_is_queued() {
        let now = Utc::now();
        let window = Duration::minutes(30);

        let overdue = ticket_with(Some(now - Duration::minutes(31)), now);
        let far = ticket_with(Some(now + Duration::hours(2)), now);
        let walk_in = ticket_with(None, now);
        let edge = ticket_with(Some(now - window), now);

        assert_eq!(ServeRank::of(&overdue, now, window), ServeRank::Queued);
        assert_eq!(ServeRank::of(&far, now, window), ServeRank::Queued);
        assert_eq!(ServeRank::of(&walk_in, now, window), ServeRank::Queued);
        assert_eq!(ServeRank::of(&edge, now, window), ServeRank::Near(window));
    }
}
