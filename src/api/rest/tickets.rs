//! Ticket endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::{session_origin, ApiResponse};
use crate::api::state::AppState;
use crate::types::{NewTicket, QueueError, Ticket, TicketId, TicketUpdate};

/// GET /api/tickets - All tickets, done or not
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Ticket>>>, QueueError> {
    let tickets = state.service.list_tickets()?;
    let total = tickets.len();
    Ok(Json(ApiResponse::with_total(
        tickets,
        state.current_sequence_id(),
        total,
    )))
}

/// POST /api/tickets - Create a ticket at the back of the line
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<NewTicket>,
) -> Result<(StatusCode, Json<ApiResponse<Ticket>>), QueueError> {
    let ticket = state
        .service
        .create_ticket(request, session_origin(&headers))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ticket, state.current_sequence_id())),
    ))
}

/// GET /api/tickets/:id
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TicketId>,
) -> Result<Json<ApiResponse<Ticket>>, QueueError> {
    let ticket = state.service.get_ticket(id)?;
    Ok(Json(ApiResponse::new(ticket, state.current_sequence_id())))
}

/// PUT /api/tickets/:id - Partial update
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TicketId>,
    headers: HeaderMap,
    Json(update): Json<TicketUpdate>,
) -> Result<Json<ApiResponse<Ticket>>, QueueError> {
    let ticket = state
        .service
        .update_ticket(id, update, session_origin(&headers))?;
    Ok(Json(ApiResponse::new(ticket, state.current_sequence_id())))
}

/// DELETE /api/tickets/:id - Returns the deleted ticket
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TicketId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Ticket>>, QueueError> {
    let ticket = state.service.delete_ticket(id, session_origin(&headers))?;
    Ok(Json(ApiResponse::new(ticket, state.current_sequence_id())))
}
