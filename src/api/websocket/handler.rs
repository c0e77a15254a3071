//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};

use super::messages::{ClientMessage, ServerMessage};
use crate::api::rest::ApiError;
use crate::api::state::AppState;
use crate::api::StreamParams;
use crate::broadcast::{EventKind, EventKinds, Subscription};

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<StreamParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let kinds = match params.kinds() {
        Ok(kinds) => kinds,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(e))).into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, kinds, params.session))
}

/// Handle an individual WebSocket connection
async fn handle_socket(
    mut socket: WebSocket,
    state: Arc<AppState>,
    kinds: EventKinds,
    session: Option<String>,
) {
    // Register before reading the store so nothing slips between the two
    let (snapshot, mut subscription) = match state
        .broadcaster()
        .subscribe_with_snapshot(kinds, state.service.store())
    {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "Failed to build WebSocket snapshot");
            let _ = send_json(&mut socket, &ServerMessage::error("snapshot_failed", e.to_string())).await;
            return;
        }
    };

    debug!(subscriber = subscription.id(), ?session, "WebSocket connected");

    if !send_json(&mut socket, &ServerMessage::Snapshot { snapshot }).await {
        return;
    }

    loop {
        tokio::select! {
            result = subscription.recv() => {
                match result {
                    Some(msg) => {
                        if msg.is_echo_for(session.as_deref()) {
                            continue;
                        }
                        if !send_json(&mut socket, &msg).await {
                            break;
                        }
                    }
                    None => {
                        // Dropped for falling behind, or server shutting down
                        let error = ServerMessage::error(
                            "resync",
                            "Event stream closed, reconnect for a fresh snapshot",
                        );
                        let _ = send_json(&mut socket, &error).await;
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, &mut socket, &state, &subscription).await {
                            break;
                        }
                    }
                    Some(Err(_)) => break,
                    None => break,
                }
            }
        }
    }

    debug!(subscriber = subscription.id(), "WebSocket closed");
}

/// Handle a message from the client
/// Returns false if the connection should be closed
async fn handle_client_message(
    msg: Message,
    socket: &mut WebSocket,
    state: &AppState,
    subscription: &Subscription,
) -> bool {
    match msg {
        Message::Text(text) => {
            let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    let error = ServerMessage::error("bad_message", e.to_string());
                    return send_json(socket, &error).await;
                }
            };

            match client_msg {
                ClientMessage::Ping => send_json(socket, &ServerMessage::pong()).await,
                ClientMessage::Subscribe { kinds: added } => {
                    let mut kinds = current_kinds(state, subscription);
                    added.into_iter().for_each(|k| kinds.insert(k));
                    update_kinds(socket, state, subscription, kinds).await
                }
                ClientMessage::Unsubscribe { kinds: removed } => {
                    let mut kinds = current_kinds(state, subscription);
                    removed.into_iter().for_each(|k| kinds.remove(k));
                    update_kinds(socket, state, subscription, kinds).await
                }
            }
        }
        Message::Binary(_) => true,
        Message::Ping(data) => socket.send(Message::Pong(data)).await.is_ok(),
        Message::Pong(_) => true,
        Message::Close(_) => false,
    }
}

fn current_kinds(state: &AppState, subscription: &Subscription) -> EventKinds {
    state
        .broadcaster()
        .kinds_of(subscription.id())
        .unwrap_or_else(EventKinds::none)
}

async fn update_kinds(
    socket: &mut WebSocket,
    state: &AppState,
    subscription: &Subscription,
    kinds: EventKinds,
) -> bool {
    if !state.broadcaster().set_kinds(subscription.id(), kinds) {
        return false;
    }
    let listed = [EventKind::Changes, EventKind::Refresh]
        .into_iter()
        .filter(|k| kinds.contains(*k))
        .collect();
    send_json(socket, &ServerMessage::Subscribed { kinds: listed }).await
}

/// Serialize and send; false if the client is gone
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize WebSocket message");
            true
        }
    }
}
