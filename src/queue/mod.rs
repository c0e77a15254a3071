//! Queue Service - composition of store, selector and broadcaster
//!
//! Mutations write to the store and then publish a change event. Selection
//! queries read a fresh snapshot from the store and rank it. The selector
//! and the broadcaster never call each other.

mod crud;
mod query;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::broadcast::Broadcaster;
use crate::selector::{QueueSelector, SelectionPolicy};
use crate::store::{FileTicketStore, TicketStore};
use crate::types::{NewTicket, QueueResult, Ticket, TicketId, TicketUpdate};

/// Request-facing entry point for every queue operation
pub struct QueueService {
    pub(crate) store: Arc<dyn TicketStore>,
    pub(crate) broadcaster: Broadcaster,
    pub(crate) selector: QueueSelector,
    /// Held by every mutation from its first read through its publish, so
    /// validation sees the row being written and events follow write order
    pub(crate) write_lock: Mutex<()>,
}

impl QueueService {
    /// Create a service over `store`, publishing through `broadcaster`
    pub fn new(
        store: Arc<dyn TicketStore>,
        broadcaster: Broadcaster,
        policy: SelectionPolicy,
    ) -> Self {
        Self {
            store,
            broadcaster,
            selector: QueueSelector::new(policy),
            write_lock: Mutex::new(()),
        }
    }

    /// Service over an in-memory store with default settings
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(FileTicketStore::in_memory()),
            Broadcaster::default(),
            SelectionPolicy::default(),
        )
    }

    pub fn store(&self) -> &dyn TicketStore {
        self.store.as_ref()
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn selector(&self) -> &QueueSelector {
        &self.selector
    }
}

// Operations live in submodules; the methods below are the public surface.
impl QueueService {
    // CRUD operations (from crud.rs)
    pub fn create_ticket(&self, request: NewTicket, origin: Option<String>) -> QueueResult<Ticket> {
        crud::create_ticket(self, request, origin)
    }

    pub fn get_ticket(&self, id: TicketId) -> QueueResult<Ticket> {
        crud::get_ticket(self, id)
    }

    pub fn list_tickets(&self) -> QueueResult<Vec<Ticket>> {
        crud::list_tickets(self)
    }

    pub fn update_ticket(
        &self,
        id: TicketId,
        update: TicketUpdate,
        origin: Option<String>,
    ) -> QueueResult<Ticket> {
        crud::update_ticket(self, id, update, origin)
    }

    pub fn delete_ticket(&self, id: TicketId, origin: Option<String>) -> QueueResult<Ticket> {
        crud::delete_ticket(self, id, origin)
    }

    // Selection queries (from query.rs)
    pub fn next_to_serve(&self, now: DateTime<Utc>) -> QueueResult<Ticket> {
        query::next_to_serve(self, now)
    }

    pub fn schedule_candidate(&self, now: DateTime<Utc>) -> QueueResult<Ticket> {
        query::schedule_candidate(self, now)
    }

    pub fn latest_arrival(&self, now: DateTime<Utc>) -> QueueResult<Ticket> {
        query::latest_arrival(self, now)
    }

    pub fn first_in_line(&self, now: DateTime<Utc>) -> QueueResult<Ticket> {
        query::first_in_line(self, now)
    }

    pub fn serve_order(&self, now: DateTime<Utc>) -> QueueResult<Vec<Ticket>> {
        query::serve_order(self, now)
    }

    pub fn next_position_in_line(&self) -> QueueResult<u64> {
        query::next_position_in_line(self)
    }

    /// Ask every display listening for refresh pings to reload
    pub fn request_refresh(&self, reason: Option<String>) -> usize {
        query::request_refresh(self, reason)
    }
}
