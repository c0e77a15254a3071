//! Ticket mutations with change publication
//!
//! Every mutation holds the service write lock from its first store read
//! until its event is published. Validation therefore checks the row that
//! is actually written, and change events leave in store write order.

use tracing::info;

use crate::broadcast::{ChangeKind, QueueEvent};
use crate::types::{NewTicket, QueueError, QueueResult, Ticket, TicketId, TicketUpdate};
use crate::utils::current_minute;
use crate::validation::{validate_new_ticket, validate_ticket};

use super::QueueService;

fn publish_change(service: &QueueService, change: ChangeKind, ticket: &Ticket, origin: Option<String>) {
    service
        .broadcaster
        .publish(QueueEvent::ticket_changed(change, ticket.clone(), origin));
}

/// Create a ticket at the back of the line
///
/// Two concurrent walk-ins never share a position.
pub fn create_ticket(
    service: &QueueService,
    request: NewTicket,
    origin: Option<String>,
) -> QueueResult<Ticket> {
    validate_new_ticket(&request)?;

    let _guard = service.write_lock.lock();
    let position = service.store.max_position_in_line()? + 1;
    let draft = request.into_draft(current_minute(), position);
    let id = service.store.insert(draft.clone())?;
    let ticket = Ticket::from_draft(id, draft);

    info!(
        id = ticket.id,
        position = ticket.position_in_line,
        appointment = ?ticket.scheduled_appointment_time,
        "Ticket created"
    );
    publish_change(service, ChangeKind::Created, &ticket, origin);
    Ok(ticket)
}

pub fn get_ticket(service: &QueueService, id: TicketId) -> QueueResult<Ticket> {
    service.store.get(id)?.ok_or(QueueError::NotFound(id))
}

pub fn list_tickets(service: &QueueService) -> QueueResult<Vec<Ticket>> {
    Ok(service.store.list_all()?)
}

/// Apply a partial update; the merged ticket must still be valid
pub fn update_ticket(
    service: &QueueService,
    id: TicketId,
    update: TicketUpdate,
    origin: Option<String>,
) -> QueueResult<Ticket> {
    if update.is_empty() {
        return get_ticket(service, id);
    }

    let _guard = service.write_lock.lock();
    let existing = get_ticket(service, id)?;

    let mut merged = existing;
    update.apply_to(&mut merged);
    validate_ticket(&merged)?;

    if service.store.update(id, &update)? == 0 {
        return Err(QueueError::NotFound(id));
    }
    let ticket = service.store.get(id)?.unwrap_or(merged);

    info!(id, done = ticket.done, "Ticket updated");
    publish_change(service, ChangeKind::Updated, &ticket, origin);
    Ok(ticket)
}

/// Delete a ticket; the event carries its last known fields
pub fn delete_ticket(
    service: &QueueService,
    id: TicketId,
    origin: Option<String>,
) -> QueueResult<Ticket> {
    let _guard = service.write_lock.lock();
    let existing = get_ticket(service, id)?;
    if service.store.delete(id)? == 0 {
        return Err(QueueError::NotFound(id));
    }

    info!(id, "Ticket deleted");
    publish_change(service, ChangeKind::Deleted, &existing, origin);
    Ok(existing)
}
