//! Application builder: wires router, middleware and state into an Axum app.

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use warden_core::config::ServerConfig;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds.max(1),
        )))
        .layer(TraceLayer::new_for_http())
}
