//! Health check endpoints for monitoring and diagnostics

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
    /// Tracker state
    pub tracker: TrackerHealth,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
}

/// Tracker health details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerHealth {
    /// Tracker service status
    pub status: String,
    /// Active calls right now
    pub active_calls: usize,
    /// Concluded calls recorded
    pub completed_calls: usize,
    /// Ticks applied since start
    pub ticks: u64,
    /// Wall-clock time of the last tick
    pub last_tick: Option<DateTime<Utc>>,
}

/// Readiness check response (simpler than health)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Service readiness status
    pub ready: bool,
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
}

/// Liveness probe
///
/// Always 200 while the process serves requests; `status` is `degraded` when
/// the tick task is not running.
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "timestamp": "2024-03-15T14:25:30Z",
///   "tracker": {
///     "status": "running",
///     "active_calls": 2,
///     "completed_calls": 5,
///     "ticks": 3600,
///     "last_tick": "2024-03-15T14:25:30Z"
///   },
///   "uptime_seconds": 3600
/// }
/// ```
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let metrics = state.tracker.metrics();
    let stats = state.tracker.stats();

    let status = if state.tracker.is_running() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        tracker: TrackerHealth {
            status: metrics.status.as_str().to_string(),
            active_calls: stats.active,
            completed_calls: stats.completed,
            ticks: metrics.ticks,
            last_tick: metrics.last_tick,
        },
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Readiness probe
///
/// Returns 200 once the tracker's tick task is running, 503 otherwise.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let ready = state.tracker.is_running();
    if !ready {
        warn!(status = state.tracker.status().as_str(), "Readiness check failed");
    }

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(ReadinessResponse {
            ready,
            timestamp: Utc::now(),
        }),
    )
}
