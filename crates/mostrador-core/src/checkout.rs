//! # Checkout Module
//!
//! Turns an incoming sale request into a validated [`SaleDraft`] and
//! computes its totals. Everything here runs before the database is touched.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/sales (JSON)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleRequest ──► SaleDraft::from_request ──► SaleDraft                  │
//! │                  ├── lines: 1..=100                                     │
//! │                  ├── payment method present + known                     │
//! │                  ├── quantity 1..=999, price >= 0, ids > 0              │
//! │                  └── line totals (checked multiply)                     │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                  SaleTotals::compute (subtotal, 16% tax, total)         │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                  mostrador-db: SaleRepository::register (transaction)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, TaxRate};
use crate::validation::{validate_id, validate_price_cents, validate_quantity};
use crate::MAX_SALE_LINES;

// =============================================================================
// Wire Types
// =============================================================================

/// Body of `POST /api/sales`.
///
/// Everything is optional at the serde level so that a missing list or
/// payment method surfaces as a validation error with a field name, not as
/// a generic JSON rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItemRequest>,
}

/// One requested line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(rename = "unitPrice", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub unit_price_cents: i64,
}

// =============================================================================
// Sale Draft
// =============================================================================

/// A validated line, ready to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl SaleLine {
    fn new(product_id: i64, quantity: i64, unit_price_cents: i64) -> CoreResult<Self> {
        let line_total = Money::from_cents(unit_price_cents)
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| amount_overflow("lineTotal"))?;

        Ok(SaleLine {
            product_id,
            quantity,
            unit_price_cents,
            line_total_cents: line_total.cents(),
        })
    }

    /// Replaces the unit price (catalog pricing) and recomputes the line total.
    pub fn reprice(&mut self, unit_price_cents: i64) -> CoreResult<()> {
        *self = SaleLine::new(self.product_id, self.quantity, unit_price_cents)?;
        Ok(())
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A sale that passed every check that does not need the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    pub client_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub lines: Vec<SaleLine>,
    pub tax_rate: TaxRate,
}

impl SaleDraft {
    /// Validates a request.
    ///
    /// ## Errors
    /// - [`CoreError::EmptySale`] when there are no line items
    /// - [`CoreError::TooManyLines`] above [`MAX_SALE_LINES`]
    /// - [`CoreError::Validation`] for a missing/unknown payment method or a
    ///   bad quantity, price or id
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::checkout::{LineItemRequest, SaleDraft, SaleRequest};
    /// use mostrador_core::types::TaxRate;
    ///
    /// let request = SaleRequest {
    ///     client_id: None,
    ///     payment_method: Some("efectivo".to_string()),
    ///     line_items: vec![LineItemRequest { product_id: 1, quantity: 2, unit_price_cents: 1000 }],
    /// };
    /// let draft = SaleDraft::from_request(request, TaxRate::default()).unwrap();
    /// assert_eq!(draft.totals().unwrap().total_cents, 2320);
    /// ```
    pub fn from_request(request: SaleRequest, tax_rate: TaxRate) -> CoreResult<Self> {
        if request.line_items.is_empty() {
            return Err(CoreError::EmptySale);
        }
        if request.line_items.len() > MAX_SALE_LINES {
            return Err(CoreError::TooManyLines { max: MAX_SALE_LINES });
        }

        let payment_method = match request.payment_method.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag.parse::<PaymentMethod>()?,
            _ => {
                return Err(ValidationError::Required {
                    field: "paymentMethod".to_string(),
                }
                .into())
            }
        };

        if let Some(client_id) = request.client_id {
            validate_id("clientId", client_id)?;
        }

        let lines = request
            .line_items
            .iter()
            .map(|item| {
                validate_id("productId", item.product_id)?;
                validate_quantity(item.quantity)?;
                validate_price_cents("unitPrice", item.unit_price_cents)?;
                SaleLine::new(item.product_id, item.quantity, item.unit_price_cents)
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(SaleDraft {
            client_id: request.client_id,
            payment_method,
            lines,
            tax_rate,
        })
    }

    /// Totals for the current lines.
    pub fn totals(&self) -> CoreResult<SaleTotals> {
        SaleTotals::compute(&self.lines, self.tax_rate)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Subtotal, tax and total of a sale, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl SaleTotals {
    /// subtotal = Σ line totals, tax = subtotal × rate (half up), total = subtotal + tax.
    pub fn compute(lines: &[SaleLine], tax_rate: TaxRate) -> CoreResult<Self> {
        let subtotal = lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.line_total()))
            .ok_or_else(|| amount_overflow("subtotal"))?;
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| amount_overflow("total"))?;

        Ok(SaleTotals {
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            total_cents: total.cents(),
        })
    }
}

fn amount_overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
