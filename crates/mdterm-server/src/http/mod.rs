//! HTTP API: one-shot execution, connection info, and health.
//!
//! - `GET /health` - Health check
//! - `GET /api/terminal/info` - Where the interactive terminal listens
//! - `POST /api/terminal/execute` - Run one sandboxed command

pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/terminal/info", get(routes::terminal_info))
        .route("/api/terminal/execute", post(routes::execute))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
