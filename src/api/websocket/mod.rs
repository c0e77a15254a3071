//! WebSocket module for live queue displays
//!
//! Provides the `/ws` endpoint. A client gets one snapshot of every ticket,
//! then each queue event published after it, in sequence order.
//! Clients can change which event kinds they receive with
//! `subscribe`/`unsubscribe` messages.

pub mod handler;
pub mod messages;

pub use handler::ws_handler;
