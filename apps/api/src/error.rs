//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mostrador                              │
//! │                                                                         │
//! │  Handler ── Result<T, ApiError>                                         │
//! │     │                                                                   │
//! │     ├── JsonRejection / QueryRejection ─────────► 400 INVALID_REQUEST   │
//! │     ├── CoreError::Validation, EmptySale ───────► 400 VALIDATION_ERROR  │
//! │     ├── DbError::NotFound ──────────────────────► 404 NOT_FOUND         │
//! │     ├── InsufficientStock ──────────────────────► 409 INSUFFICIENT_STOCK│
//! │     ├── Product/ClientNotFound in a sale ───────► 409 BUSINESS_RULE     │
//! │     ├── UniqueViolation ────────────────────────► 409 DUPLICATE         │
//! │     ├── PoolExhausted / ConnectionFailed ───────► 503 UNAVAILABLE       │
//! │     └── anything else (logged, message hidden) ─► 500 DATABASE_ERROR    │
//! │                                                                         │
//! │  Body: { "error": "...", "code": "...", "details": "..."? }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mostrador_core::CoreError;
use mostrador_db::DbError;
use serde::Serialize;

/// Error returned from every handler.
///
/// ## Serialization
/// ```json
/// {
///   "error": "Insufficient stock for product 7: available 3, requested 5",
///   "code": "INSUFFICIENT_STOCK"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Human-readable message for display
    #[serde(rename = "error")]
    pub message: String,

    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Extra context, e.g. the serde message behind a malformed body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body, query or path could not be parsed (400)
    InvalidRequest,

    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Not enough stock for a sale line (409)
    InsufficientStock,

    /// Stock or catalog state refused the operation (409)
    BusinessRule,

    /// Unique or foreign key constraint (409)
    Duplicate,

    /// Invalid reference to another record (409)
    InvalidReference,

    /// Database unreachable or pool exhausted (503)
    Unavailable,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidRequest | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock
            | ErrorCode::BusinessRule
            | ErrorCode::Duplicate
            | ErrorCode::InvalidReference => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            message: message.into(),
            code,
            details: None,
        }
    }

    /// Attaches details to the error body.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::InvalidReference, "Invalid reference")
            }
            DbError::Rejected(reason) => ApiError::from(reason),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::Unavailable, "Database unavailable")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::Unavailable, "Database busy, try again")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
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
        let message = err.to_string();
        match err {
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::ProductNotFound(_) | CoreError::ClientNotFound(_) => {
                ApiError::new(ErrorCode::BusinessRule, message)
            }
            CoreError::EmptySale | CoreError::TooManyLines { .. } => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorCode::InvalidRequest, "Malformed JSON body")
            .with_details(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ErrorCode::InvalidRequest, "Invalid query string")
            .with_details(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(ErrorCode::InvalidRequest, "Invalid path parameter")
            .with_details(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mostrador_core::ValidationError;

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::from(CoreError::EmptySale);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(DbError::Rejected(CoreError::Validation(
            ValidationError::Required {
                field: "sku".to_string(),
            },
        )));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "sku is required");
    }

    #[test]
    fn test_business_rejections_are_conflicts() {
        let stock = ApiError::from(DbError::Rejected(CoreError::InsufficientStock {
            product_id: 7,
            available: 3,
            requested: 5,
        }));
        assert_eq!(stock.status(), StatusCode::CONFLICT);
        assert_eq!(stock.code, ErrorCode::InsufficientStock);

        let product = ApiError::from(DbError::Rejected(CoreError::ProductNotFound(9)));
        assert_eq!(product.status(), StatusCode::CONFLICT);

        let duplicate = ApiError::from(DbError::duplicate("sku", "COCA-600"));
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(duplicate.message, "sku 'COCA-600' already exists");
    }

    #[test]
    fn test_infrastructure_errors_hide_details() {
        let busy = ApiError::from(DbError::PoolExhausted);
        assert_eq!(busy.status(), StatusCode::SERVICE_UNAVAILABLE);

        let query = ApiError::from(DbError::QueryFailed("disk I/O error at page 42".to_string()));
        assert_eq!(query.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!query.message.contains("page 42"));
        assert!(query.details.is_none());
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(ApiError::not_found("Product", 12)).unwrap();
        assert_eq!(body["error"], "Product not found: 12");
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body.get("details").is_none());

        let body = serde_json::to_value(ApiError::validation("bad").with_details("line 1")).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"], "line 1");
    }
}
