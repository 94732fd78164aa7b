//! Mapping of domain failures onto HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::errors::DomainError;
use crate::domain::ports::{LlmError, TrackerError};
use crate::infrastructure::ingestion::LoaderError;
use crate::infrastructure::logging::scrub_secrets;
use crate::services::{GenerationError, PipelineError};

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Raw model output for generation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Tracker keys created before a batch failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Vec<String>>,
}

/// An error returned by a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    raw: Option<String>,
    created: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            raw: None,
            created: None,
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    fn with_raw(mut self, raw: Option<&str>) -> Self {
        self.raw = raw.map(ToString::to_string);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = scrub_secrets(&self.message);
        if self.status.is_server_error() {
            error!(status = %self.status, code = self.code, error = %message, "request failed");
        } else {
            warn!(status = %self.status, code = self.code, error = %message, "request rejected");
        }

        let body = ErrorResponse {
            error: message,
            code: self.code.to_string(),
            raw: self.raw,
            created: self.created,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        let raw = err.raw_output().map(ToString::to_string);
        let mapped = match &err {
            GenerationError::UnsupportedStack(_) => {
                Self::bad_request("unsupported_stack", err.to_string())
            }
            GenerationError::Backend(LlmError::MissingApiKey(_)) => {
                Self::bad_request("missing_api_key", err.to_string())
            }
            GenerationError::Backend(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "backend_error", err.to_string())
            }
            GenerationError::InvalidJson { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "invalid_json", err.to_string())
            }
            GenerationError::SchemaViolation { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "schema_violation", err.to_string())
            }
        };
        mapped.with_raw(raw.as_deref())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Retrieval(DomainError::ValidationFailed(message)) => {
                Self::bad_request("invalid_request", message)
            }
            PipelineError::Retrieval(inner) => {
                Self::new(StatusCode::BAD_GATEWAY, "retrieval_failed", inner.to_string())
            }
            PipelineError::AllChunksFailed {
                attempted,
                last_error,
            } => {
                let inner = Self::from(last_error);
                Self {
                    code: "all_chunks_failed",
                    message: format!("All {attempted} selected chunks failed; last error: {}", inner.message),
                    ..inner
                }
            }
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::MissingConfig(_) => {
                Self::bad_request("tracker_not_configured", err.to_string())
            }
            TrackerError::PartialCreate { ref created, .. } => {
                let created = Some(created.clone());
                Self {
                    created,
                    ..Self::new(StatusCode::BAD_GATEWAY, "tracker_partial_create", err.to_string())
                }
            }
            _ => Self::new(StatusCode::BAD_GATEWAY, "tracker_error", err.to_string()),
        }
    }
}

impl From<LoaderError> for ApiError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::UnsupportedFormat(_) => {
                Self::bad_request("unsupported_format", err.to_string())
            }
            LoaderError::Io { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "io_error", err.to_string())
            }
            _ => Self::bad_request("invalid_document", err.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationFailed(_) => Self::bad_request("invalid_request", err.to_string()),
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                err.to_string(),
            ),
        }
    }
}
