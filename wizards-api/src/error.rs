//! Error types for wizards-api
//!
//! Every handler returns [`ApiResult`]; the error renders as
//! `{"error": {"code": ..., "message": ...}}` with the matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - duplicate entity or ambiguous identifier
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<wizards_common::Error> for ApiError {
    fn from(err: wizards_common::Error) -> Self {
        use wizards_common::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                ApiError::Conflict(db.message().to_string())
            }
            Error::Database(sqlx::Error::Database(db)) if db.is_check_violation() => {
                ApiError::BadRequest(db.message().to_string())
            }
            Error::Database(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                ApiError::NotFound(db.message().to_string())
            }
            other => {
                // Store and I/O failures are not retried; the caller re-submits.
                error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        wizards_common::Error::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_not_found_maps_to_404() {
        let err: ApiError = wizards_common::Error::NotFound("course CSC999".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_common_conflict_maps_to_409() {
        let err: ApiError = wizards_common::Error::Conflict("duplicate".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_config_error_maps_to_500() {
        let err: ApiError = wizards_common::Error::Config("bad".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_failure_maps_to_500() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
