pub mod api;
pub mod ws;

pub use api::api_routes;
pub use ws::ws_handler;

use axum::{Router, routing::get};

/// Assemble the full application router
pub fn routes(api_state: api::ApiState, ws_state: ws::WsState) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "Corkboard Server" }))
        .route("/health", get(|| async { "OK" }))
        // WebSocket realtime channel
        .route("/ws", get(ws_handler).with_state(ws_state))
        // API routes
        .nest("/api", api_routes(api_state))
}
