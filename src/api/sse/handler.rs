//! SSE stream handler

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use tracing::debug;

use super::SseEvent;
use crate::api::rest::ApiError;
use crate::api::state::AppState;
use crate::api::StreamParams;

/// Keep-alive comment interval for idle streams
const KEEP_ALIVE_SECS: u64 = 15;

/// GET /api/events - Snapshot followed by live queue events
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StreamParams>,
) -> Response {
    let kinds = match params.kinds() {
        Ok(kinds) => kinds,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(e))).into_response(),
    };

    let (snapshot, mut subscription) = match state
        .broadcaster()
        .subscribe_with_snapshot(kinds, state.service.store())
    {
        Ok(pair) => pair,
        Err(e) => return e.into_response(),
    };

    let session = params.session;
    debug!(subscriber = subscription.id(), ?session, "SSE client connected");

    let stream = async_stream::stream! {
        let sequence_id = snapshot.sequence_id;
        yield Ok::<_, Infallible>(to_event(&SseEvent::Snapshot { snapshot }, sequence_id));

        loop {
            match subscription.recv().await {
                Some(msg) => {
                    if msg.is_echo_for(session.as_deref()) {
                        continue;
                    }
                    let sequence_id = msg.sequence_id;
                    yield Ok(to_event(&SseEvent::QueueEvent { message: msg }, sequence_id));
                }
                None => {
                    let error = SseEvent::Error {
                        code: "resync".to_string(),
                        message: "Event stream closed, reconnect for a fresh snapshot".to_string(),
                    };
                    yield Ok(Event::default()
                        .event(error.name())
                        .data(serde_json::to_string(&error).unwrap_or_default()));
                    break;
                }
            }
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)))
        .into_response()
}

fn to_event(event: &SseEvent, sequence_id: u64) -> Event {
    Event::default()
        .event(event.name())
        .id(sequence_id.to_string())
        .data(serde_json::to_string(event).unwrap_or_default())
}
