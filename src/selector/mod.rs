//! Queue Selector - next-to-serve policy
//!
//! Pure functions over a snapshot of tickets and the current time. Nothing
//! here mutates or caches; every call ranks the full slice it is given.
//!
//! # Policy
//!
//! - Only tickets created inside the recency window (12h) are considered
//!   for the live views, whether or not they are done.
//! - An appointment within 30 minutes of now, either side, jumps the walk-in
//!   line; the closest one wins.
//! - Everything else is served by `positionInLine`.

mod rank;

pub use rank::ServeRank;

use chrono::{DateTime, Duration, Utc};

use crate::types::Ticket;
use rank::{schedule_key, serve_key};

/// Default recency window in hours
pub const RECENCY_WINDOW_HOURS: i64 = 12;

/// Default near-appointment window in minutes
pub const NEAR_WINDOW_MINUTES: i64 = 30;

/// Time windows driving the selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Tickets created before `now - recency_window` are not current
    pub recency_window: Duration,
    /// Appointments within this distance of now are served first
    pub near_window: Duration,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            recency_window: Duration::hours(RECENCY_WINDOW_HOURS),
            near_window: Duration::minutes(NEAR_WINDOW_MINUTES),
        }
    }
}

impl SelectionPolicy {
    pub fn new(recency_window: Duration, near_window: Duration) -> Self {
        Self {
            recency_window,
            near_window,
        }
    }
}

/// Ranks tickets under a `SelectionPolicy`
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueSelector {
    policy: SelectionPolicy,
}

impl QueueSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Tickets created inside the recency window, done or not
    fn current<'a>(
        &self,
        tickets: &'a [Ticket],
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Ticket> + 'a {
        let window = self.policy.recency_window;
        tickets.iter().filter(move |t| t.is_current(now, window))
    }

    /// Active tickets created inside the recency window
    fn waiting<'a>(
        &self,
        tickets: &'a [Ticket],
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Ticket> + 'a {
        self.current(tickets, now).filter(|t| t.is_active())
    }

    /// The ticket to call next
    pub fn next_to_serve<'a>(&self, tickets: &'a [Ticket], now: DateTime<Utc>) -> Option<&'a Ticket> {
        let near_window = self.policy.near_window;
        self.waiting(tickets, now)
            .min_by_key(|t| serve_key(t, now, near_window))
    }

    /// Every waiting ticket in the order it would be called
    pub fn serve_order<'a>(&self, tickets: &'a [Ticket], now: DateTime<Utc>) -> Vec<&'a Ticket> {
        let near_window = self.policy.near_window;
        let mut order: Vec<&Ticket> = self.waiting(tickets, now).collect();
        order.sort_by_key(|t| serve_key(t, now, near_window));
        order
    }

    /// The ticket to surface in the scheduling view
    ///
    /// Considers walk-ins and appointments whose slot has opened (at most
    /// `near_window` ahead of now). Most recent slot first, then line order.
    pub fn schedule_candidate<'a>(
        &self,
        tickets: &'a [Ticket],
        now: DateTime<Utc>,
    ) -> Option<&'a Ticket> {
        // No upper bound when the window runs past the latest representable time
        let opens_by = now.checked_add_signed(self.policy.near_window);
        self.waiting(tickets, now)
            .filter(|t| match (t.scheduled_appointment_time, opens_by) {
                (Some(at), Some(opens_by)) => at <= opens_by,
                _ => true,
            })
            .min_by_key(|t| schedule_key(t))
    }

    /// Highest-position ticket created inside the window, done or not
    pub fn latest_arrival<'a>(&self, tickets: &'a [Ticket], now: DateTime<Utc>) -> Option<&'a Ticket> {
        self.current(tickets, now)
            .max_by_key(|t| (t.position_in_line, t.id))
    }

    /// Lowest-position waiting ticket
    pub fn first_in_line<'a>(&self, tickets: &'a [Ticket], now: DateTime<Utc>) -> Option<&'a Ticket> {
        self.waiting(tickets, now)
            .min_by_key(|t| (t.position_in_line, t.id))
    }
}

/// Position for a new walk-in: one past the highest position ever assigned
///
/// Computed over the whole history, not the live window, so positions never
/// collide across the window boundary.
pub fn next_position_in_line(tickets: &[Ticket]) -> u64 {
    tickets
        .iter()
        .map(|t| t.position_in_line)
        .max()
        .map_or(1, |max| max + 1)
}

/// `QueueSelector::next_to_serve` under the default policy
pub fn next_to_serve(tickets: &[Ticket], now: DateTime<Utc>) -> Option<&Ticket> {
    QueueSelector::default().next_to_serve(tickets, now)
}

/// `QueueSelector::schedule_candidate` under the default policy
pub fn schedule_candidate(tickets: &[Ticket], now: DateTime<Utc>) -> Option<&Ticket> {
    QueueSelector::default().schedule_candidate(tickets, now)
}

/// `QueueSelector::latest_arrival` under the default policy
pub fn latest_arrival(tickets: &[Ticket], now: DateTime<Utc>) -> Option<&Ticket> {
    QueueSelector::default().latest_arrival(tickets, now)
}

/// `QueueSelector::first_in_line` under the default policy
pub fn first_in_line(tickets: &[Ticket], now: DateTime<Utc>) -> Option<&Ticket> {
    QueueSelector::default().first_in_line(tickets, now)
}
