//! Error types for mcr-report HTTP handlers
//!
//! `/generatePDF` answers failures with plain text; the JSON API wraps the
//! same errors in an `{ "error": { code, message } }` body.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::report::RenderError;

/// Report generation error
#[derive(Debug, Error)]
pub enum ReportError {
    /// Upstream fetch failed or timed out
    #[error("Error fetching clients: {0}")]
    Fetch(#[from] PipelineError),

    /// Document could not be produced
    #[error("Error generating PDF: {0}")]
    Render(#[from] RenderError),

    /// Background task failure
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Report request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// JSON API error
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ReportError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError(ReportError::Fetch(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            ReportError::Fetch(PipelineError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT")
            }
            ReportError::Fetch(PipelineError::Source(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            ReportError::Render(_) | ReportError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        let message = self.0.to_string();

        tracing::error!(code = error_code, error = %message, "API request failed");

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for JSON API handlers
pub type ApiResult<T> = Result<T, ApiError>;
