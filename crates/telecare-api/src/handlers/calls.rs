//! Call session endpoints

use crate::{
    extractors::{ApiError, CallId, JsonBody},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telecare_core::{
    ActiveCall, CallHistoryEntry, CallSession, NewCallSession, TrackerStats,
};
use tracing::info;

/// Response for listing active calls
#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveCallsResponse {
    /// Active calls in creation order
    pub calls: Vec<ActiveCall>,
    /// Number of calls returned
    pub count: usize,
}

/// Response for listing concluded calls
#[derive(Debug, Serialize, Deserialize)]
pub struct CallHistoryResponse {
    /// Concluded calls, most recent first
    pub calls: Vec<CallHistoryEntry>,
    /// Number of calls returned
    pub count: usize,
}

/// Open a new call session
///
/// Returns 201 with the created session, or 400 if a name is blank or too long.
pub async fn create_call(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<NewCallSession>,
) -> Result<(StatusCode, Json<CallSession>), ApiError> {
    let session = state.tracker.create_session(request)?;

    info!(session_id = %session.id, "Created call via API");
    Ok((StatusCode::CREATED, Json(session)))
}

/// Mark a call's patient as connected
pub async fn connect_call(
    State(state): State<Arc<AppState>>,
    CallId(id): CallId,
) -> Result<Json<CallSession>, ApiError> {
    Ok(Json(state.tracker.connect(id)?))
}

/// End a call and return its history entry
pub async fn end_call(
    State(state): State<Arc<AppState>>,
    CallId(id): CallId,
) -> Result<Json<CallHistoryEntry>, ApiError> {
    Ok(Json(state.tracker.end(id)?))
}

/// List active calls with their elapsed time
pub async fn list_active(State(state): State<Arc<AppState>>) -> Json<ActiveCallsResponse> {
    let calls = state.tracker.list_active();
    Json(ActiveCallsResponse {
        count: calls.len(),
        calls,
    })
}

/// List concluded calls, most recent first
pub async fn list_history(State(state): State<Arc<AppState>>) -> Json<CallHistoryResponse> {
    let calls = state.tracker.list_history();
    Json(CallHistoryResponse {
        count: calls.len(),
        calls,
    })
}

/// Summary counts for the call desk
pub async fn call_stats(State(state): State<Arc<AppState>>) -> Json<TrackerStats> {
    Json(state.tracker.stats())
}
