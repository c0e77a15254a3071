//! Shared application state for HTTP handlers

use std::sync::Arc;

use crate::broadcast::Broadcaster;
use crate::queue::QueueService;

/// State injected into every handler
pub struct AppState {
    pub service: Arc<QueueService>,
}

impl AppState {
    pub fn new(service: Arc<QueueService>) -> Self {
        Self { service }
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        self.service.broadcaster()
    }

    /// Sequence id the next published event will carry
    pub fn current_sequence_id(&self) -> u64 {
        self.broadcaster().current_sequence_id()
    }
}
