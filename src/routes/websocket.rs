use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::{
    core::ConnectionId,
    models::{ClientEvent, ServerEvent},
    state::AppState,
};

/// Largest text frame accepted from a client
pub const MAX_FRAME_BYTES: usize = 1024;

/// WebSocket endpoint carrying all game events
///
/// # Flow
///
/// 1. Accept the upgrade and assign a connection id
/// 2. Register the connection's outbound channel with the room registry
/// 3. Forward registry events to the socket
/// 4. Parse incoming frames and dispatch them to the registry
/// 5. On close, drop the connection and every room it sat in
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();

    state.registry.write().await.connect(connection_id, event_tx);
    tracing::info!("WebSocket accepted: connection={}", connection_id);

    let (mut sender, mut receiver) = socket.split();

    // Forward registry events to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(
                        "Failed to encode event for connection={}: {}",
                        connection_id,
                        e
                    );
                    continue;
                }
            };

            if sender.send(Message::Text(text)).await.is_err() {
                tracing::debug!("Send failed, closing connection={}", connection_id);
                break;
            }
        }
    });

    // Handle incoming messages from client
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match accept_frame(&msg) {
                FrameAction::Dispatch(text) => {
                    handle_text_frame(&recv_state, connection_id, text).await;
                }
                FrameAction::Close => {
                    tracing::debug!("Closing connection={}", connection_id);
                    break;
                }
                FrameAction::Ignore => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => {
            tracing::debug!("Send task finished for connection={}", connection_id);
            recv_task.abort();
        }
        _ = &mut recv_task => {
            tracing::debug!("Receive task finished for connection={}", connection_id);
            send_task.abort();
        }
    }

    let rooms_closed = state.registry.write().await.disconnect(connection_id);

    tracing::info!(
        "WebSocket connection closed: connection={} rooms_closed={}",
        connection_id,
        rooms_closed
    );
}

/// What the receive loop does with one incoming frame
#[derive(Debug, PartialEq, Eq)]
pub enum FrameAction<'a> {
    /// Text frame to parse as a client event
    Dispatch(&'a str),
    /// Stop reading and drop the connection
    Close,
    /// Nothing to do
    Ignore,
}

/// Classify an incoming frame. Text frames over [`MAX_FRAME_BYTES`] close
/// the connection; binary frames are ignored.
pub fn accept_frame(msg: &Message) -> FrameAction<'_> {
    match msg {
        Message::Text(text) if text.len() > MAX_FRAME_BYTES => {
            tracing::warn!("Message too large: {} bytes", text.len());
            FrameAction::Close
        }
        Message::Text(text) => FrameAction::Dispatch(text.as_str()),
        Message::Close(_) => FrameAction::Close,
        // Axum answers ping frames itself
        Message::Ping(_) | Message::Pong(_) => FrameAction::Ignore,
        Message::Binary(data) => {
            tracing::warn!("Unexpected binary message: {} bytes", data.len());
            FrameAction::Ignore
        }
    }
}

/// Parse one text frame and apply it to the registry.
///
/// Malformed frames get an `error` event back; rejected game actions are
/// reported only when the registry marks them client-visible.
pub async fn handle_text_frame(state: &AppState, conn: ConnectionId, text: &str) {
    let mut registry = state.registry.write().await;

    match ClientEvent::parse(text) {
        Ok(event) => {
            let name = event.name();
            tracing::debug!("Received {} from connection={}", name, conn);

            if let Err(err) = registry.handle_event(conn, event) {
                tracing::debug!("Rejected {} from connection={}: {}", name, conn, err);
            }
        }
        Err(message) => {
            tracing::debug!("Malformed frame from connection={}: {}", conn, message);
            registry.send_to(conn, ServerEvent::Error(message));
        }
    }
}
