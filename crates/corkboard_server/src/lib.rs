//! Corkboard Server
//!
//! Realtime backend for a drag-and-drop board. Containers hold ordered
//! items; clients reorder items within and across containers over HTTP or a
//! persistent WebSocket, and every successful mutation rebroadcasts the full
//! board snapshot so all connected clients converge on the same ordering.
//!
//! ## Features
//!
//! - **HTTP API**: CRUD for containers and items plus bulk reorder
//! - **Realtime channel**: WebSocket snapshot requests and reorder submits,
//!   with full-snapshot broadcast to every connected client
//! - **Persistent storage**: SQLite-backed board state
//!
//! ## Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3030)
//! - `DATABASE_PATH`: Path to SQLite database (default: ./corkboard.db)
//! - `CORS_ORIGINS`: Comma-separated list of allowed origins

pub mod config;
pub mod handlers;
pub mod sync;

pub use config::Config;
