use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use corkboard_core::{BoardError, BoardRepo, ReorderBatch, validate_batch};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::sync::{BoardChannel, ClientConnection, ClientEvent, ServerEvent};

/// Shared state for the WebSocket handler
#[derive(Clone)]
pub struct WsState {
    pub repo: Arc<BoardRepo>,
    pub channel: Arc<BoardChannel>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(State(state): State<WsState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let connection_id = Uuid::new_v4().to_string();
    info!("WebSocket upgrade: connection={}", connection_id);

    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: WsState, connection_id: String) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut connection = ClientConnection::new(
        connection_id.clone(),
        state.repo.clone(),
        state.channel.clone(),
    );

    info!(
        "WebSocket connected: connection={}, connections={}",
        connection_id,
        state.channel.connection_count()
    );

    loop {
        tokio::select! {
            // Handle incoming events from this client
            Some(msg) = ws_rx.next() => {
                match msg {
                    Ok(Message::Text(text)) => {
                        let event = match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => event,
                            Err(e) => {
                                debug!("Malformed client event from {}: {}", connection_id, e);
                                let reply = ServerEvent::Error {
                                    message: format!("malformed event: {e}"),
                                };
                                if send_event(&mut ws_tx, &reply).await.is_err() {
                                    break;
                                }
                                continue;
                            }
                        };
                        if handle_event(event, &state, &mut ws_tx).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Ping(data)) => {
                        if ws_tx.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("Client {} requested close", connection_id);
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error on {}: {}", connection_id, e);
                        break;
                    }
                    _ => {}
                }
            }

            // Fan out broadcasts triggered by any client's mutation
            Some(event) = connection.recv_broadcast() => {
                if send_event(&mut ws_tx, &event).await.is_err() {
                    error!("Failed to send broadcast to {}", connection_id);
                    break;
                }
            }

            else => break,
        }
    }

    info!("WebSocket disconnected: connection={}", connection_id);

    // Dropping the connection removes it from the channel registry
}

/// Handle a decoded client event; `Err` means the socket is gone
async fn handle_event(
    event: ClientEvent,
    state: &WsState,
    ws_tx: &mut SplitSink<WebSocket, Message>,
) -> Result<(), ()> {
    match event {
        ClientEvent::RequestSnapshot => match state.repo.snapshot() {
            Ok(board) => send_event(ws_tx, &ServerEvent::InitialSnapshot { board }).await,
            Err(e) => {
                error!("Failed to read snapshot: {}", e);
                send_internal_error(ws_tx).await
            }
        },
        ClientEvent::SubmitReorder { containers } => {
            let batch = ReorderBatch { containers };
            let outcome = validate_batch(&batch).and_then(|_| state.repo.apply_reorder(&batch));

            match outcome {
                Ok(()) => match state.repo.snapshot() {
                    Ok(board) => {
                        state.channel.broadcast_state(board);
                        Ok(())
                    }
                    Err(e) => {
                        error!("Failed to read snapshot after reorder: {}", e);
                        send_internal_error(ws_tx).await
                    }
                },
                // A failed reorder never broadcasts
                Err(BoardError::Storage(e)) => {
                    error!("Reorder failed in store: {}", e);
                    send_internal_error(ws_tx).await
                }
                Err(err) => {
                    warn!("Reorder rejected: {}", err);
                    send_event(
                        ws_tx,
                        &ServerEvent::Error {
                            message: err.to_string(),
                        },
                    )
                    .await
                }
            }
        }
    }
}

async fn send_internal_error(ws_tx: &mut SplitSink<WebSocket, Message>) -> Result<(), ()> {
    send_event(
        ws_tx,
        &ServerEvent::Error {
            message: "internal server error".to_string(),
        },
    )
    .await
}

async fn send_event(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), ()> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to encode server event: {}", e);
            return Ok(());
        }
    };

    ws_tx.send(Message::Text(json.into())).await.map_err(|_| ())
}
