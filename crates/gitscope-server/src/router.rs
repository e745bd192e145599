//! Route table for the studio server.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;

use crate::assets::static_handler;
use crate::handlers::{
    branches_handler, commit_handler, graph_handler, health_handler, history_handler,
    search_handler, stats_handler,
};
use crate::state::ServerState;
use crate::websocket::ws_handler;

pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health_handler))
        .route("/api/graph", get(graph_handler))
        .route("/api/branches", get(branches_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/history", get(history_handler))
        .route("/api/commit/:id", get(commit_handler))
        .route("/api/search", get(search_handler))
        .route("/", get(static_handler))
        .route("/*path", get(static_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_creation() {
        let state = Arc::new(ServerState::new("/tmp/nowhere", 100));
        let _router = create_router(state);
    }
}
