//! Router configuration for the HTTP API.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::week_page))
        .route("/api/week", get(handlers::week_api))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
