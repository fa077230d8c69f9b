//! REST routes.

pub mod documents;
pub mod health;

use axum::routing::{get, put};
use axum::Router;

use crate::state::AppState;
use crate::ws::ws_handler;

pub use health::HealthResponse;

/// Builds the route table: health, document CRUD and the WebSocket endpoint.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route("/api/documents/{document_id}", put(documents::update_document))
        .route("/ws", get(ws_handler))
}
