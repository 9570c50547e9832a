//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header::ORIGIN},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::SessionCommand,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let origin = headers.get(ORIGIN);
    if !is_origin_allowed(state.allowed_origin.as_ref(), origin) {
        tracing::warn!("Rejecting WebSocket handshake from origin {:?}", origin);
        return Err(StatusCode::FORBIDDEN);
    }

    let connection_id = ConnectionIdFactory::generate();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id)))
}

/// A missing `Origin` header (non-browser client) is always accepted.
fn is_origin_allowed(allowed: Option<&HeaderValue>, origin: Option<&HeaderValue>) -> bool {
    match (allowed, origin) {
        (Some(allowed), Some(origin)) => allowed == origin,
        _ => true,
    }
}

impl From<ClientMessage> for SessionCommand {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::JoinRoom(payload) => Self::JoinRoom {
                username: payload.username,
                room: payload.room,
            },
            ClientMessage::ChatMessage(payload) => Self::ChatMessage {
                message: payload.message,
            },
            ClientMessage::Typing(payload) => Self::Typing {
                is_typing: payload.is_typing,
            },
        }
    }
}

/// Spawns a task that forwards frames queued for this connection to its WebSocket sink.
///
/// # Arguments
///
/// * `rx` - Channel receiver the MessagePusher writes into
/// * `sender` - WebSocket sink of this connection
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let controller = state.session_controller.clone();
    if let Err(e) = controller
        .dispatch(&connection_id, SessionCommand::Connect { sender: tx })
        .await
    {
        tracing::warn!("Failed to register connection '{}': {}", connection_id, e);
        return;
    }
    tracing::info!("Client '{}' connected", connection_id);

    let id = connection_id.clone();
    // Events of one connection are handled one at a time, in arrival order.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let command = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => SessionCommand::from(message),
                        Err(e) => {
                            tracing::warn!("Dropping malformed frame from '{}': {}", id, e);
                            continue;
                        }
                    };

                    let event = command.name();
                    if let Err(e) = controller.dispatch(&id, command).await {
                        tracing::debug!("Dropped '{}' from '{}': {}", event, id, e);
                    }
                }
                Message::Binary(_) => {
                    tracing::warn!("Dropping binary frame from '{}'", id);
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", id);
                    break;
                }
                // Ping/pong is answered by the WebSocket implementation
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Disconnect never fails; the result only mirrors the dispatch signature.
    let _ = state
        .session_controller
        .dispatch(&connection_id, SessionCommand::Disconnect)
        .await;
    tracing::info!("Client '{}' disconnected", connection_id);
}
