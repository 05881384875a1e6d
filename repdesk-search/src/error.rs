//! Error types for the search service
//!
//! Every error leaves the service as `{"error": message, "code": CODE}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::split_sheet::SplitSheetIssue;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Split sheet breaks one or more pre-send rules (400)
    #[error("Split sheet is not ready to send")]
    Validation(Vec<SplitSheetIssue>),

    /// repdesk-common error
    #[error(transparent)]
    Common(#[from] repdesk_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use repdesk_common::Error as CommonError;

        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Validation(issues) => {
                let message = issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                let body = Json(json!({
                    "error": message,
                    "code": "VALIDATION",
                    "issues": issues,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::Common(err) => match err {
                CommonError::Config(msg) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg)
                }
                CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
                CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                ref upstream @ CommonError::Upstream { .. } => {
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", upstream.to_string())
                }
                ref other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    other.to_string(),
                ),
            },
        };

        let body = Json(json!({
            "error": message,
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
