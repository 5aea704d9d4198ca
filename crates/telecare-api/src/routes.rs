//! API route definitions

use crate::{handlers, state::AppState};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

/// Build call session routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/calls", post(handlers::calls::create_call))
        .route("/api/calls/active", get(handlers::calls::list_active))
        .route("/api/calls/history", get(handlers::calls::list_history))
        .route("/api/calls/stats", get(handlers::calls::call_stats))
        .route("/api/calls/:id/connect", post(handlers::calls::connect_call))
        .route("/api/calls/:id/end", post(handlers::calls::end_call))
        .layer(CompressionLayer::new())
}

/// Build health check routes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
}

/// Build the complete router without state
pub fn build_router() -> Router<Arc<AppState>> {
    Router::new().merge(api_routes()).merge(health_routes())
}
