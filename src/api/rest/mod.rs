//! REST API module for HTTP endpoints
//!
//! Provides REST endpoints for ticket management and queue selection:
//! - `GET/POST /api/tickets` - List or create tickets
//! - `GET/PUT/DELETE /api/tickets/:id` - Single ticket
//! - `GET /api/queue/*` - Selection queries
//! - `POST /api/queue/refresh` - Ask displays to refresh

pub mod queue;
pub mod tickets;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::types::QueueError;

/// Header carrying the caller's session tag, echoed as the event origin
pub const SESSION_HEADER: &str = "x-session-id";

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Broadcaster sequence id at the time of the response
    #[serde(rename = "sequenceId")]
    pub sequence_id: u64,
    /// Total count (for list responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, sequence_id: u64) -> Self {
        Self {
            data,
            sequence_id,
            total: None,
        }
    }

    pub fn with_total(data: T, sequence_id: u64, total: usize) -> Self {
        Self {
            data,
            sequence_id,
            total: Some(total),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: &str) -> Self {
        Self {
            error: message.into(),
            code: code.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, "BAD_REQUEST")
    }
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            QueueError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            QueueError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            QueueError::NoEligibleTicket => (StatusCode::NOT_FOUND, "NO_ELIGIBLE_TICKET"),
            QueueError::InvalidTicket(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_TICKET"),
        };
        if let QueueError::StoreUnavailable(ref source) = self {
            error!(error = %source, "Ticket store unavailable");
        }
        (status, Json(ApiError::new(self.to_string(), code))).into_response()
    }
}

/// Session tag from the request headers, if any
pub fn session_origin(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
