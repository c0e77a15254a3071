//! Ticket record store
//!
//! The queue core only needs a narrow keyed-record interface from its
//! storage. `TicketStore` is that interface; `FileTicketStore` is the
//! bundled implementation, an in-memory table optionally mirrored to a
//! JSON Lines file.

mod file;

pub use file::FileTicketStore;

use thiserror::Error;

use crate::types::{Ticket, TicketDraft, TicketId, TicketUpdate};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a ticket store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keyed record store holding ticket rows
///
/// Every method is atomic with respect to the others. `list_all` returns
/// a consistent snapshot.
pub trait TicketStore: Send + Sync {
    /// Insert a new ticket and return its assigned id
    fn insert(&self, draft: TicketDraft) -> StoreResult<TicketId>;

    /// Fetch one ticket
    fn get(&self, id: TicketId) -> StoreResult<Option<Ticket>>;

    /// Fetch every ticket, done or not
    fn list_all(&self) -> StoreResult<Vec<Ticket>>;

    /// Apply a partial update; returns the number of rows changed (0 or 1)
    fn update(&self, id: TicketId, update: &TicketUpdate) -> StoreResult<usize>;

    /// Delete a ticket; returns the number of rows removed (0 or 1)
    fn delete(&self, id: TicketId) -> StoreResult<usize>;

    /// Highest `positionInLine` among stored rows, 0 when empty
    fn max_position_in_line(&self) -> StoreResult<u64>;
}
