//! # Validation Module
//!
//! Input validation for Mostrador.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms                                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock >= 0) constraints                         │
//! │  ├── UNIQUE (sku)                                                      │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::validation::{validate_sku, validate_quantity};
//!
//! validate_sku("COKE-600").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{ClientInput, ProductInput, ProviderInput};
use crate::{MAX_ITEM_QUANTITY, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 500;
const MAX_PHONE_LEN: usize = 30;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (shelf code).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use mostrador_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-600").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product, client, provider).
///
/// Must be non-empty after trimming and at most 200 characters.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field against a length limit.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an optional email address.
///
/// Deliverability is not our problem; we only reject obvious typos.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    validate_optional_text("email", Some(email), MAX_NAME_LEN)?;

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        }),
    }
}

/// Validates an optional phone number (length only).
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<()> {
    validate_optional_text("phone", phone.map(str::trim), MAX_PHONE_LEN)
}

/// Validates a search query and returns it trimmed.
///
/// Empty is allowed (no filter); at most 100 characters.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (promotional items).
///
/// ## Example
/// ```rust
/// use mostrador_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 1099).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level or threshold (0 to MAX_STOCK).
pub fn validate_stock(field: &str, stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

/// Validates a manual stock adjustment.
///
/// ## Rules
/// - Must not be zero
/// - Magnitude at most MAX_STOCK
///
/// ## Example
/// ```rust
/// use mostrador_core::validation::validate_stock_delta;
///
/// assert!(validate_stock_delta(-12).is_ok());
/// assert!(validate_stock_delta(0).is_err());
/// assert!(validate_stock_delta(i64::MIN).is_err());
/// ```
pub fn validate_stock_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::InvalidFormat {
            field: "delta".to_string(),
            reason: "must not be zero".to_string(),
        });
    }

    if delta.unsigned_abs() > MAX_STOCK as u64 {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_STOCK,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

/// Validates a database identifier supplied by the caller.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a product create/update payload.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_sku(&input.sku)?;
    validate_name("name", &input.name)?;
    validate_optional_text("description", input.description.as_deref(), MAX_TEXT_LEN)?;
    if let Some(provider_id) = input.provider_id {
        validate_id("providerId", provider_id)?;
    }
    validate_price_cents("price", input.price_cents)?;
    if let Some(cost) = input.cost_cents {
        validate_price_cents("cost", cost)?;
    }
    validate_stock("stock", input.stock)?;
    validate_stock("minStock", input.min_stock)?;
    Ok(())
}

/// Validates a client create/update payload.
pub fn validate_client_input(input: &ClientInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_phone(input.phone.as_deref())?;
    validate_email(input.email.as_deref())?;
    validate_optional_text("address", input.address.as_deref(), MAX_TEXT_LEN)?;
    validate_optional_text("taxId", input.tax_id.as_deref().map(str::trim), 13)?;
    Ok(())
}

/// Validates a provider create/update payload.
pub fn validate_provider_input(input: &ProviderInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_optional_text("contactName", input.contact_name.as_deref(), MAX_NAME_LEN)?;
    validate_phone(input.phone.as_deref())?;
    validate_email(input.email.as_deref())?;
    validate_optional_text("address", input.address.as_deref(), MAX_TEXT_LEN)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
