//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │         │                                                               │
//! │         ├── ValidationError ─► CoreError ─┐                            │
//! │         ├── sqlx::Error ─────► DbError ───┼──► ApiError ──► response   │
//! │         └── JsonRejection ────────────────┘                            │
//! │                                                                         │
//! │  HTTP 409                                                              │
//! │  {                                                                     │
//! │    "success": false,                                                   │
//! │    "code": "CONFLICT",                                                 │
//! │    "message": "You have already reviewed this product"                 │
//! │  }                                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged with their detail; the client only ever
//! sees a generic message for them.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::CoreError;
use storefront_db::DbError;

/// Error returned from every handler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Not enough stock for an order line (400)
    InsufficientStock,

    /// Illegal order status change (400)
    InvalidTransition,

    /// Missing bearer token or bad credentials (401)
    Unauthenticated,

    /// Invalid token or insufficient role (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Duplicate record (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::InsufficientStock
            | ErrorCode::InvalidTransition => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
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

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{entity} not found: {id}"))
            }
            DbError::UniqueViolation { field, value } => {
                tracing::debug!(%field, %value, "Unique constraint violated");
                ApiError::conflict("Resource already exists")
            }
            DbError::Domain(core) => core.into(),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Server is busy, please retry")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => {
                ApiError::not_found(format!("{entity} not found: {id}"))
            }
            CoreError::InsufficientStock { product, .. } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!("Insufficient stock for {product}"),
            ),
            e @ CoreError::InvalidStatusTransition { .. } => {
                ApiError::new(ErrorCode::InvalidTransition, e.to_string())
            }
            CoreError::Conflict(message) => ApiError::conflict(message),
            e @ (CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::AmountOverflow) => {
                ApiError::validation(e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<storefront_core::ValidationError> for ApiError {
    fn from(err: storefront_core::ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed or mistyped JSON bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        ApiError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: ErrorCode,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code,
            message: &self.message,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
