use std::sync::Arc;

use corkboard_core::BoardRepo;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{BoardChannel, ServerEvent};

/// Represents a connected realtime client
pub struct ClientConnection {
    pub connection_id: String,
    repo: Arc<BoardRepo>,
    channel: Arc<BoardChannel>,
    broadcast_rx: broadcast::Receiver<ServerEvent>,
}

impl ClientConnection {
    /// Create a new client connection subscribed to the board channel
    pub fn new(connection_id: String, repo: Arc<BoardRepo>, channel: Arc<BoardChannel>) -> Self {
        let broadcast_rx = channel.subscribe();

        Self {
            connection_id,
            repo,
            channel,
            broadcast_rx,
        }
    }

    /// Receive the next broadcast event.
    ///
    /// A lagged receiver gets a freshly read snapshot instead of the events
    /// it missed; since broadcasts carry the full board, the latest state is
    /// all a client ever needs.
    pub async fn recv_broadcast(&mut self) -> Option<ServerEvent> {
        match self.broadcast_rx.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    "Client {} lagged {} events, resending current board",
                    self.connection_id, n
                );
                match self.repo.snapshot() {
                    Ok(board) => Some(ServerEvent::StateUpdated { board }),
                    Err(e) => {
                        warn!("Failed to read snapshot for lagged client: {}", e);
                        None
                    }
                }
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

impl Drop for ClientConnection {
    fn drop(&mut self) {
        self.channel.unsubscribe();
        debug!("Client disconnected: {}", self.connection_id);
    }
}
