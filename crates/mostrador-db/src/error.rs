//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          Business rule hit mid-transaction │
//! │       │                                        │                        │
//! │       ▼                                        ▼                        │
//! │  DbError (this module)  ◄─────────  DbError::Rejected(CoreError)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (mostrador-api) ← status code + JSON body                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Dashboard displays the message                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use mostrador_core::CoreError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    /// - UPDATE/DELETE touched zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting or renaming to a duplicate SKU
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Product pointing at a provider that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A business rule rejected the operation (e.g. insufficient stock).
    ///
    /// The enclosing transaction has already been rolled back.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened
    /// - Pool was closed during shutdown
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (including CHECK constraints and trigger aborts).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not be started or committed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Attaches the offending value to a UniqueViolation raised by SQLite,
    /// which only reports the column.
    pub fn with_duplicate_value(self, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.to_string(),
            },
            other => other,
        }
    }

    /// True for failures of the storage itself rather than of the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::PoolExhausted | DbError::ConnectionFailed(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .and_then(|target| target.rsplit('.').next())
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        assert!(DbError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(DbError::from(sqlx::Error::PoolClosed).is_unavailable());
        assert!(!DbError::not_found("Product", 1).is_unavailable());
    }

    #[test]
    fn test_with_duplicate_value() {
        let err = DbError::duplicate("sku", "unknown").with_duplicate_value("COKE-600");
        assert_eq!(err.to_string(), "Duplicate sku: 'COKE-600' already exists");

        let untouched = DbError::PoolExhausted.with_duplicate_value("x");
        assert!(matches!(untouched, DbError::PoolExhausted));
    }

    #[test]
    fn test_rejected_is_transparent() {
        let err: DbError = CoreError::ProductNotFound(9).into();
        assert_eq!(err.to_string(), "Product not found: 9");
    }
}
