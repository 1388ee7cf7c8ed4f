//! # Error Types
//!
//! Domain-specific error types for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mostrador-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures (+ Rejected(CoreError))       │
//! │                                                                         │
//! │  mostrador-api errors                                                  │
//! │  └── ApiError         - JSON body + HTTP status                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule rejections.
///
/// These are caller-fixable conditions, never infrastructure failures.
/// The API layer reports them as 4xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product does not exist or has been deactivated.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Client referenced by a sale does not exist.
    #[error("Client not found: {0}")]
    ClientNotFound(i64),

    /// Not enough stock to cover the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 5)
    ///      │
    ///      ▼
    /// UPDATE ... WHERE stock >= 5  → 0 rows
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, dashboard shows "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A sale was submitted without line items.
    #[error("A sale needs at least one line item")]
    EmptySale,

    /// Sale has more lines than allowed.
    #[error("A sale cannot have more than {max} line items")]
    TooManyLines { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True when the error came from bad input rather than from the state
    /// of the stock or catalog.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::EmptySale | CoreError::TooManyLines { .. } | CoreError::Validation(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any database interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad email, bad sku characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 3, requested 5"
        );
        assert_eq!(CoreError::ProductNotFound(42).to_string(), "Product not found: 42");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "paymentMethod".to_string(),
        };
        assert_eq!(err.to_string(), "paymentMethod is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_validation());
    }

    #[test]
    fn test_stock_errors_are_not_validation() {
        assert!(!CoreError::ProductNotFound(1).is_validation());
        assert!(CoreError::EmptySale.is_validation());
    }
}
