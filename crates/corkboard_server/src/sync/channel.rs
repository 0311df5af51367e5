use std::sync::atomic::{AtomicUsize, Ordering};

use corkboard_core::{ReorderContainer, Snapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Events a client may send over the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Ask for the current board; answered with `initial_snapshot`, no
    /// broadcast side effect
    RequestSnapshot,
    /// Apply a bulk reorder; on success the new snapshot is broadcast to
    /// every connected client
    SubmitReorder { containers: Vec<ReorderContainer> },
}

/// Events the server sends to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full board, sent only to the requesting client
    InitialSnapshot { board: Snapshot },
    /// Full board, broadcast to all clients (including the originator of
    /// the triggering mutation)
    StateUpdated { board: Snapshot },
    /// Sent only to the offending client; never broadcast
    Error { message: String },
}

/// Registry of connected realtime clients.
///
/// Owned by the server for its whole lifetime. Connections subscribe on
/// attach and drop their entry on disconnect; nothing here is persisted.
pub struct BoardChannel {
    broadcast_tx: broadcast::Sender<ServerEvent>,
    connection_count: AtomicUsize,
}

impl BoardChannel {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            broadcast_tx,
            connection_count: AtomicUsize::new(0),
        }
    }

    /// Subscribe to broadcast events
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.connection_count.fetch_add(1, Ordering::SeqCst);
        self.broadcast_tx.subscribe()
    }

    /// Unsubscribe from broadcast events
    pub fn unsubscribe(&self) {
        self.connection_count.fetch_sub(1, Ordering::SeqCst);
    }

    /// Get the number of active connections
    pub fn connection_count(&self) -> usize {
        self.connection_count.load(Ordering::SeqCst)
    }

    /// Broadcast the post-mutation snapshot to every connected client
    pub fn broadcast_state(&self, board: Snapshot) {
        let _ = self.broadcast_tx.send(ServerEvent::StateUpdated { board });
    }
}

impl Default for BoardChannel {
    fn default() -> Self {
        Self::new()
    }
}
