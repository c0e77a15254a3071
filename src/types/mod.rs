//! Data types for the visitor queue
//!
//! This module contains the ticket model, request shapes and the error taxonomy.

mod error;
mod ticket;

pub use error::QueueError;
pub use ticket::{NewTicket, Ticket, TicketDraft, TicketId, TicketUpdate};

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
