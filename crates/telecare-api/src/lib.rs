//! Telecare call desk API server library
//!
//! Exposes the call session tracker over HTTP/JSON: create, connect and end
//! calls, list the active desk and the concluded history, plus liveness and
//! readiness probes.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use extractors::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::Router;
use std::sync::Arc;
use telecare_core::Config;
use telecare_tracker::TrackerService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
///
/// The tracker is shared, not started; the caller owns its lifecycle.
pub fn build_router(config: Config, tracker: Arc<TrackerService>) -> Router {
    let enable_cors = config.api.enable_cors;
    let state = Arc::new(AppState::new(config, tracker));

    let app = routes::build_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
