//! API module for HTTP, WebSocket and SSE endpoints
//!
//! REST endpoints manage tickets and answer selection queries; the
//! WebSocket and SSE endpoints push queue events to live displays.

pub mod http;
pub mod rest;
pub mod sse;
pub mod state;
pub mod websocket;

use serde::Deserialize;

use crate::broadcast::EventKinds;

pub use http::create_router;
pub use state::AppState;

/// Query parameters shared by the streaming endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    /// Comma separated event kinds, e.g. `changes,refresh`; all when absent
    pub kinds: Option<String>,
    /// Session tag; events this session caused are not echoed back
    pub session: Option<String>,
}

impl StreamParams {
    pub fn kinds(&self) -> Result<EventKinds, String> {
        match &self.kinds {
            Some(list) => EventKinds::parse_list(list),
            None => Ok(EventKinds::all()),
        }
    }
}
