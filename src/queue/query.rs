//! Selection queries over a fresh store snapshot

use chrono::{DateTime, Utc};

use crate::broadcast::QueueEvent;
use crate::selector;
use crate::types::{QueueError, QueueResult, Ticket};

use super::QueueService;

/// Run `pick` over all tickets; a failed read is reported, never ranked
fn select(
    service: &QueueService,
    pick: impl for<'a> FnOnce(&'a [Ticket]) -> Option<&'a Ticket>,
) -> QueueResult<Ticket> {
    let tickets = service.store.list_all()?;
    pick(&tickets).cloned().ok_or(QueueError::NoEligibleTicket)
}

pub fn next_to_serve(service: &QueueService, now: DateTime<Utc>) -> QueueResult<Ticket> {
    select(service, |tickets| service.selector.next_to_serve(tickets, now))
}

pub fn schedule_candidate(service: &QueueService, now: DateTime<Utc>) -> QueueResult<Ticket> {
    select(service, |tickets| service.selector.schedule_candidate(tickets, now))
}

pub fn latest_arrival(service: &QueueService, now: DateTime<Utc>) -> QueueResult<Ticket> {
    select(service, |tickets| service.selector.latest_arrival(tickets, now))
}

pub fn first_in_line(service: &QueueService, now: DateTime<Utc>) -> QueueResult<Ticket> {
    select(service, |tickets| service.selector.first_in_line(tickets, now))
}

pub fn serve_order(service: &QueueService, now: DateTime<Utc>) -> QueueResult<Vec<Ticket>> {
    let tickets = service.store.list_all()?;
    Ok(service
        .selector
        .serve_order(&tickets, now)
        .into_iter()
        .cloned()
        .collect())
}

pub fn next_position_in_line(service: &QueueService) -> QueueResult<u64> {
    let tickets = service.store.list_all()?;
    Ok(selector::next_position_in_line(&tickets))
}

pub fn request_refresh(service: &QueueService, reason: Option<String>) -> usize {
    service.broadcaster.publish(QueueEvent::refresh(reason))
}
