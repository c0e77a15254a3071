//! Visitor Queue Server
//!
//! Ticket queue for a walk-in and appointment front desk, with live
//! updates pushed to every connected display.
//!
//! # Features
//!
//! - **Ticket CRUD**: Create, update, delete and list visitor tickets
//! - **Selection**: Next to serve, scheduling view, latest arrival, first in line
//! - **Live Updates**: WebSocket and SSE streams with snapshot-then-subscribe
//! - **Persistence**: JSON Lines ticket file with atomic rewrites
//!
//! # Modules
//!
//! - `types`: Core data structures (Ticket, NewTicket, TicketUpdate, QueueError)
//! - `store`: Ticket storage trait and the file-backed store
//! - `selector`: Pure selection rules over a ticket list
//! - `broadcast`: Subscriber registry and event fan-out
//! - `queue`: Service tying store, selector and broadcaster together
//! - `validation`: Ticket field validation
//! - `utils`: Time helpers
//! - `config`: Environment configuration
//! - `api`: HTTP, WebSocket and SSE endpoints
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use visitor_queue::{NewTicket, QueueService};
//!
//! let service = QueueService::in_memory();
//! service.create_ticket(NewTicket::walk_in("Ada", "Lovelace"), None).unwrap();
//! let next = service.next_to_serve(Utc::now()).unwrap();
//! println!("Now serving {} {}", next.first_name, next.last_name);
//! ```

pub mod api;
pub mod broadcast;
pub mod config;
pub mod queue;
pub mod selector;
pub mod store;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use broadcast::{Broadcaster, EventKind, EventKinds, QueueEvent, QueueMessage, Subscription};
pub use config::Config;
pub use queue::QueueService;
pub use selector::{QueueSelector, SelectionPolicy};
pub use store::{FileTicketStore, TicketStore};
pub use types::{NewTicket, QueueError, QueueResult, Ticket, TicketId, TicketUpdate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
