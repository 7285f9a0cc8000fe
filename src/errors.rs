//! Structured error types for the gesture store and its HTTP surface
//!
//! Two tiers: correctness errors (wrong vector length, bad input) reject the
//! operation and reach the client; durability errors are logged by the store
//! and only surface where the operation itself is about the backup (reset).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error types with proper categorization
#[derive(Debug)]
pub enum AppError {
    // Validation Errors (400)
    DimensionMismatch { expected: usize, actual: usize },
    InvalidInput { field: String, reason: String },

    // Internal Errors (500)
    PersistenceFailure(String),
    CorruptArtifact(String),

    // Generic wrapper for external errors
    Internal(anyhow::Error),
}

impl AppError {
    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::CorruptArtifact(_) => "CORRUPT_ARTIFACT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DimensionMismatch { .. } | Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,

            Self::PersistenceFailure(_) | Self::CorruptArtifact(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get detailed error message
    pub fn message(&self) -> String {
        match self {
            Self::DimensionMismatch { expected, actual } => {
                format!("Vector has wrong length: expected {expected} values, got {actual}")
            }
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::PersistenceFailure(msg) => format!("Backup persistence failed: {msg}"),
            Self::CorruptArtifact(msg) => format!("Backup artifact is corrupt: {msg}"),
            Self::Internal(err) => format!("Internal error: {err}"),
        }
    }

    /// True for errors caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Convert to structured error response
    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            Self::DimensionMismatch { expected, actual } => {
                Some(format!("expected={expected} actual={actual}"))
            }
            _ => None,
        };
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message(),
            details,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

/// Convert from anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Axum IntoResponse implementation for proper HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self.message());
        }
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

/// Helper trait to convert validation errors
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> Result<T>;
}

impl<T> ValidationErrorExt<T> for anyhow::Result<T> {
    fn map_validation_err(self, field: &str) -> Result<T> {
        self.map_err(|e| AppError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::DimensionMismatch {
            expected: 1890,
            actual: 63,
        };
        assert_eq!(err.code(), "DIMENSION_MISMATCH");
        assert_eq!(
            AppError::PersistenceFailure("disk full".to_string()).code(),
            "PERSISTENCE_FAILURE"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PersistenceFailure("failed".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(AppError::InvalidInput {
            field: "label".to_string(),
            reason: "empty".to_string()
        }
        .is_client_error());
    }

    #[test]
    fn test_dimension_mismatch_response_names_both_lengths() {
        let response = AppError::DimensionMismatch {
            expected: 1890,
            actual: 10,
        }
        .to_response();

        assert_eq!(response.code, "DIMENSION_MISMATCH");
        assert!(response.message.contains("1890"));
        assert!(response.message.contains("10"));
        assert_eq!(response.details.as_deref(), Some("expected=1890 actual=10"));
    }

    #[test]
    fn test_validation_error_ext() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("label cannot be empty"));
        let err = result.map_validation_err("label").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(err.message().contains("'label'"));
    }
}
