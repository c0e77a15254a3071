//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::rest::{queue, tickets};
use super::sse::sse_handler;
use super::state::AppState;
use super::websocket::ws_handler;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // Displays are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Live updates
        .route("/ws", get(ws_handler))
        .route("/api/events", get(sse_handler))
        // Health check
        .route("/health", get(health_check))
        // Tickets
        .route(
            "/api/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/api/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        // Selection
        .route("/api/queue", get(queue::serve_order))
        .route("/api/queue/next", get(queue::next_to_serve))
        .route("/api/queue/schedule", get(queue::schedule_candidate))
        .route("/api/queue/latest", get(queue::latest_arrival))
        .route("/api/queue/first", get(queue::first_in_line))
        .route("/api/queue/next-position", get(queue::next_position))
        .route("/api/queue/refresh", post(queue::request_refresh))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
