//! Queue selection endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::api::state::AppState;
use crate::types::{QueueError, Ticket};

type TicketResponse = Result<Json<ApiResponse<Ticket>>, QueueError>;

/// GET /api/queue - Waiting tickets in calling order
pub async fn serve_order(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Ticket>>>, QueueError> {
    let order = state.service.serve_order(Utc::now())?;
    let total = order.len();
    Ok(Json(ApiResponse::with_total(
        order,
        state.current_sequence_id(),
        total,
    )))
}

/// GET /api/queue/next - Who to call next
pub async fn next_to_serve(State(state): State<Arc<AppState>>) -> TicketResponse {
    let ticket = state.service.next_to_serve(Utc::now())?;
    Ok(Json(ApiResponse::new(ticket, state.current_sequence_id())))
}

/// GET /api/queue/schedule - Scheduling view candidate
pub async fn schedule_candidate(State(state): State<Arc<AppState>>) -> TicketResponse {
    let ticket = state.service.schedule_candidate(Utc::now())?;
    Ok(Json(ApiResponse::new(ticket, state.current_sequence_id())))
}

/// GET /api/queue/latest - Most recent arrival, done or not
pub async fn latest_arrival(State(state): State<Arc<AppState>>) -> TicketResponse {
    let ticket = state.service.latest_arrival(Utc::now())?;
    Ok(Json(ApiResponse::new(ticket, state.current_sequence_id())))
}

/// GET /api/queue/first - Front of the walk-in line
pub async fn first_in_line(State(state): State<Arc<AppState>>) -> TicketResponse {
    let ticket = state.service.first_in_line(Utc::now())?;
    Ok(Json(ApiResponse::new(ticket, state.current_sequence_id())))
}

#[derive(Debug, Serialize)]
pub struct NextPosition {
    #[serde(rename = "positionInLine")]
    pub position_in_line: u64,
}

/// GET /api/queue/next-position - Position the next walk-in would get
pub async fn next_position(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<NextPosition>>, QueueError> {
    let position_in_line = state.service.next_position_in_line()?;
    Ok(Json(ApiResponse::new(
        NextPosition { position_in_line },
        state.current_sequence_id(),
    )))
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub delivered: usize,
}

/// POST /api/queue/refresh - Ping every display listening for refreshes
pub async fn request_refresh(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RefreshParams>,
) -> Json<ApiResponse<RefreshResult>> {
    let delivered = state.service.request_refresh(params.reason);
    Json(ApiResponse::new(
        RefreshResult { delivered },
        state.current_sequence_id(),
    ))
}
