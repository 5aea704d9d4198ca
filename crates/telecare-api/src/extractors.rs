//! Request extractors and the JSON error body they reject with

use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use telecare_core::SessionId;
use telecare_tracker::TrackerError;
use tracing::error;

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional details
    pub details: Option<serde_json::Value>,
}

/// An error that renders as an [`ErrorResponse`]
#[derive(Debug)]
pub struct ApiError {
    /// Error message
    pub message: String,
    /// HTTP status code
    pub status: StatusCode,
    /// Error code for API responses
    pub code: &'static str,
    /// Additional context
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(message: impl Into<String>, status: StatusCode, code: &'static str) -> Self {
        Self {
            message: message.into(),
            status,
            code,
            details: None,
        }
    }

    /// Create a bad request error
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST, "INVALID_PARAMETERS")
    }

    /// Attach details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::SessionNotFound { id } => Self::new(
                format!("Call {id} not found"),
                StatusCode::NOT_FOUND,
                "CALL_NOT_FOUND",
            ),
            TrackerError::Validation { field, message } => {
                Self::invalid_parameters(format!("Invalid {field}: {message}"))
                    .with_details(serde_json::json!({ "field": field }))
            }
            other => {
                error!(error = %other, "Tracker operation failed");
                Self::new(
                    "Internal tracker error",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
            details: self.details,
        };

        (self.status, Json(response)).into_response()
    }
}

/// JSON body extractor that rejects with an [`ErrorResponse`]
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|err| {
            ApiError::invalid_parameters("Invalid JSON body")
                .with_details(serde_json::json!({ "json_error": err.body_text() }))
        })?;

        Ok(Self(data))
    }
}

/// `:id` path segment parsed as a [`SessionId`]
#[derive(Debug, Clone, Copy)]
pub struct CallId(pub SessionId);

#[async_trait]
impl<S> FromRequestParts<S> for CallId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<SessionId>::from_request_parts(parts, state)
            .await
            .map_err(|err| {
                ApiError::invalid_parameters("Call id must be a UUID")
                    .with_details(serde_json::json!({ "path_error": err.body_text() }))
            })?;

        Ok(Self(id))
    }
}
