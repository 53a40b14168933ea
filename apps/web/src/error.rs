//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Source                                   Status   code                 │
//! │  ──────                                   ──────   ────                 │
//! │  ValidationError / ImportError / bad JSON  400     VALIDATION_ERROR     │
//! │  CoreError::ItemNotFound / BarcodeNotFound 404     NOT_FOUND            │
//! │  CoreError::AlreadySold                    409     CONFLICT             │
//! │  DbError (store failures)                  500     DATABASE_ERROR       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Body is always:
//! ```json
//! { "code": "NOT_FOUND", "message": "Item not found: 3f0c..." }
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use shoebox_core::{CoreError, ValidationError};
use shoebox_db::DbError;

/// Error returned from every handler.
#[derive(Debug, Clone, Serialize, thiserror::Error, TS)]
#[error("[{code:?}] {message}")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Item already sold (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ItemNotFound(_) | CoreError::BarcodeNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            CoreError::AlreadySold { .. } => ApiError::new(ErrorCode::Conflict, err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Render(msg) => {
                tracing::error!("Report rendering failed: {}", msg);
                ApiError::new(ErrorCode::Internal, "Report rendering failed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
///
/// Store failures are logged in full but reported generically.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation(e) => ApiError::validation(e.to_string()),
            DbError::Import(e) => ApiError::validation(e.to_string()),
            DbError::Core(e) => e.into(),
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { .. } | DbError::ConstraintViolation(_) => {
                tracing::error!("Constraint violation: {}", err);
                ApiError::validation("Value rejected by the store")
            }
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Malformed JSON bodies get the same 400 shape as validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
