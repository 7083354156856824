//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from lingo-core errors. Storage and internal failures are
// logged with their specifics and surfaced as a generic retryable
// message.
impl From<lingo_core::error::LingoError> for ApiError {
    fn from(err: lingo_core::error::LingoError) -> Self {
        use lingo_core::error::LingoError;

        match err {
            LingoError::Validation { message, code, .. } => {
                ApiError::validation(message).with_details(serde_json::json!({
                    "code": code.as_str()
                }))
            }
            LingoError::NotFound { message, .. } => ApiError::not_found(message),
            LingoError::Parse { message, .. } => {
                ApiError::validation(format!("Invalid test markup: {}", message))
            }
            LingoError::Configuration(msg) => ApiError::bad_request(msg),
            LingoError::Database { message, .. } => {
                error!(error = %message, "database error");
                ApiError::internal("Something went wrong. Please try again.")
            }
            LingoError::Serialization(e) => {
                error!(error = %e, "serialization error");
                ApiError::internal("Something went wrong. Please try again.")
            }
            LingoError::Io(e) => {
                error!(error = %e, "io error");
                ApiError::internal("Something went wrong. Please try again.")
            }
            LingoError::Internal(msg) => {
                error!(error = %msg, "internal error");
                ApiError::internal("Something went wrong. Please try again.")
            }
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
