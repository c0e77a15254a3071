//! Error taxonomy for queue operations

use thiserror::Error;

use super::TicketId;
use crate::store::StoreError;

/// Errors surfaced by the queue service
#[derive(Debug, Error)]
pub enum QueueError {
    /// The record store could not be read or written. Never retried here.
    #[error("ticket store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The requested ticket does not exist
    #[error("ticket {0} not found")]
    NotFound(TicketId),

    /// A selection query found no qualifying ticket
    #[error("no eligible ticket")]
    NoEligibleTicket,

    /// A ticket was rejected before reaching the store
    #[error("invalid ticket: {0}")]
    InvalidTicket(String),
}

impl QueueError {
    /// Build an `InvalidTicket` error
    pub fn invalid(reason: impl Into<String>) -> Self {
        QueueError::InvalidTicket(reason.into())
    }
}
