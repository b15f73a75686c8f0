//! Error types for troublebox-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use troublebox_engine::EngineError;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Engine construction error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unrecognized severity in the request path
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidLevel(name) => ApiError::InvalidLevel(name),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            ApiError::InvalidLevel(_) => (
                StatusCode::BAD_REQUEST,
                "INVALID_LEVEL",
                Some(serde_json::json!({ "valid": ["normal", "hardcore", "nightmare"] })),
            ),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::InvalidLevel("chaos".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_engine_errors_map_to_api_errors() {
        let invalid: ApiError = EngineError::InvalidLevel("chaos".to_string()).into();
        assert!(matches!(invalid, ApiError::InvalidLevel(ref name) if name == "chaos"));

        let io: ApiError = EngineError::Io(std::io::Error::other("disk full")).into();
        assert!(matches!(io, ApiError::Internal(ref msg) if msg.contains("disk full")));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::InvalidLevel("chaos".to_string()).to_string(),
            "Invalid level: chaos"
        );
        assert_eq!(
            DaemonError::Config("bad addr".to_string()).to_string(),
            "Configuration error: bad addr"
        );
    }
}
