//! Ticket validation
//!
//! Rejects malformed tickets before they reach the store.

mod ticket;

pub use ticket::{validate_new_ticket, validate_ticket, MAX_NAME_LEN, MAX_NOTES_LEN};
