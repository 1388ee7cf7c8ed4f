//! # Domain Types
//!
//! Core domain types used throughout Mostrador.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Provider     │◄──│    Product      │   │     Client      │       │
//! │  │  id, name       │   │  id, sku, name  │   │  id, name       │       │
//! │  │  contact        │   │  price_cents    │   │  tax_id (RFC)   │       │
//! │  └─────────────────┘   │  stock          │   └────────▲────────┘       │
//! │                        │  min_stock      │            │ (optional)     │
//! │                        │  expiration     │   ┌────────┴────────┐       │
//! │                        └────────▲────────┘   │      Sale       │       │
//! │                                 │            │  payment_method │       │
//! │                        ┌────────┴────────┐   │  subtotal/tax/  │       │
//! │                        │    SaleItem     │──►│  total          │       │
//! │                        │  quantity       │   └─────────────────┘       │
//! │                        │  unit_price     │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are database-generated integers. Money fields are stored as
//! integer cents and travel over JSON as decimal numbers
//! (see [`crate::money::decimal`]).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so the Mexican IVA of 16% is 1600 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. Drives the per-method breakdown of the daily cut.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Efectivo.
    Cash,
    /// Tarjeta (external terminal).
    Card,
    /// Transferencia.
    Transfer,
}

impl PaymentMethod {
    /// All methods, in the order the daily cut lists them.
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Transfer];

    /// Canonical lowercase tag, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    /// Accepts the canonical tags plus the Spanish names the register uses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "card" | "tarjeta" => Ok(PaymentMethod::Card),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            _ => Err(ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Pricing and Business Date
// =============================================================================

/// Where the unit price of a sale line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Trust the `unitPrice` sent by the register.
    #[default]
    Request,
    /// Re-read the price from the product row inside the sale transaction.
    Catalog,
}

/// Store-local calendar date for an instant.
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use mostrador_core::types::business_date;
///
/// // 03:00 UTC is still the previous evening in Mexico City (UTC-6)
/// let now = Utc.with_ymd_and_hms(2026, 10, 16, 3, 0, 0).unwrap();
/// assert_eq!(business_date(now, -360), NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
/// ```
pub fn business_date(now: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    (now + chrono::Duration::minutes(i64::from(utc_offset_minutes))).date_naive()
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    /// Business code printed on the shelf label.
    pub sku: String,

    pub name: String,

    pub description: Option<String>,

    /// Who supplies this product.
    pub provider_id: Option<i64>,

    /// Unit sale price.
    #[serde(rename = "price", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub price_cents: i64,

    /// Purchase price, for margin reports.
    #[serde(rename = "cost", with = "crate::money::decimal::option")]
    #[ts(type = "number | null")]
    pub cost_cents: Option<i64>,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Low-stock alert threshold.
    pub min_stock: i64,

    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,

    /// False once the product is deleted (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Create/update payload for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub provider_id: Option<i64>,
    #[serde(rename = "price", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub price_cents: i64,
    #[serde(rename = "cost", with = "crate::money::decimal::option", default)]
    #[ts(type = "number | null")]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body of a manual stock adjustment (restock, shrinkage, count correction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    /// Positive to add units, negative to remove them.
    pub delta: i64,
}

// =============================================================================
// Client
// =============================================================================

/// A registered customer. Sales may reference one, or none for walk-ins.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// RFC, needed to issue invoices.
    pub tax_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

// =============================================================================
// Provider
// =============================================================================

/// A supplier of products.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInput {
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A registered sale (header row). Immutable once committed.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    pub client_id: Option<i64>,
    pub payment_method: PaymentMethod,
    #[serde(rename = "subtotal", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub subtotal_cents: i64,
    #[serde(rename = "tax", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub tax_cents: i64,
    #[serde(rename = "total", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_cents: i64,
    /// Store-local calendar date, used by the daily cut.
    #[ts(as = "String")]
    pub business_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item of a sale. Price is frozen at the time of sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Current catalog name, joined for display.
    pub product_name: String,
    pub quantity: i64,
    #[serde(rename = "unitPrice", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub unit_price_cents: i64,
    #[serde(rename = "lineTotal", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub line_total_cents: i64,
}

/// A sale header together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// What a successful registration reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub sale_id: i64,
    #[serde(rename = "subtotal", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub subtotal_cents: i64,
    #[serde(rename = "tax", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub tax_cents: i64,
    #[serde(rename = "total", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_cents: i64,
}

// =============================================================================
// Report Rows
// =============================================================================

/// Row of the low-stock alert.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub stock: i64,
    pub min_stock: i64,
    pub provider_name: Option<String>,
}

/// Row of the expiring-products alert.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringItem {
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub stock: i64,
    #[ts(as = "String")]
    pub expiration_date: NaiveDate,
    /// Negative once the product has expired.
    pub days_remaining: i64,
}

/// One payment method's share of the daily cut.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CutLine {
    pub payment_method: PaymentMethod,
    pub sales_count: i64,
    #[serde(rename = "subtotal", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub subtotal_cents: i64,
    #[serde(rename = "tax", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub tax_cents: i64,
    #[serde(rename = "total", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_cents: i64,
}

/// Corte de caja: the day's sales grouped by payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyCut {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub by_method: Vec<CutLine>,
    pub sales_count: i64,
    #[serde(rename = "subtotal", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub subtotal_cents: i64,
    #[serde(rename = "tax", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub tax_cents: i64,
    #[serde(rename = "total", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_cents: i64,
}

impl DailyCut {
    /// Builds the cut from its per-method lines, summing the grand totals.
    pub fn from_lines(date: NaiveDate, mut by_method: Vec<CutLine>) -> Self {
        by_method.sort_by_key(|line| line.payment_method);
        DailyCut {
            date,
            sales_count: by_method.iter().map(|l| l.sales_count).sum(),
            subtotal_cents: by_method.iter().map(|l| l.subtotal_cents).sum(),
            tax_cents: by_method.iter().map(|l| l.tax_cents).sum(),
            total_cents: by_method.iter().map(|l| l.total_cents).sum(),
            by_method,
        }
    }
}

/// Row of the top-sellers ranking.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopSeller {
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub units_sold: i64,
    #[serde(rename = "revenue", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub revenue_cents: i64,
}

/// Row of the revenue-by-provider report.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRevenue {
    /// `None` groups products without a provider.
    pub provider_id: Option<i64>,
    pub provider_name: Option<String>,
    pub units_sold: i64,
    #[serde(rename = "revenue", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub revenue_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_iva() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 1600);
        assert!((rate.percentage() - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(" Tarjeta ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("TRANSFERENCIA".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert!(matches!(
            "cheque".parse::<PaymentMethod>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_payment_method_serde_tag() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Transfer).unwrap(), "\"transfer\"");
    }

    #[test]
    fn test_daily_cut_totals_match_lines() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let line = |method, count, subtotal: i64| CutLine {
            payment_method: method,
            sales_count: count,
            subtotal_cents: subtotal,
            tax_cents: subtotal * 16 / 100,
            total_cents: subtotal + subtotal * 16 / 100,
        };
        let cut = DailyCut::from_lines(
            date,
            vec![line(PaymentMethod::Card, 1, 1000), line(PaymentMethod::Cash, 2, 2500)],
        );

        assert_eq!(cut.by_method[0].payment_method, PaymentMethod::Cash);
        assert_eq!(cut.sales_count, 3);
        assert_eq!(cut.subtotal_cents, 3500);
        assert_eq!(cut.total_cents, cut.by_method.iter().map(|l| l.total_cents).sum::<i64>());
    }

    #[test]
    fn test_empty_daily_cut_is_zero() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let cut = DailyCut::from_lines(date, Vec::new());
        assert_eq!(cut.sales_count, 0);
        assert_eq!(cut.total_cents, 0);
    }

    #[test]
    fn test_business_date_offsets() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 30, 0).unwrap();
        assert_eq!(business_date(now, 0), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(business_date(now, 60), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }

    #[test]
    fn test_price_source_tags() {
        assert_eq!(PriceSource::default(), PriceSource::Request);
        let parsed: PriceSource = serde_json::from_str("\"catalog\"").unwrap();
        assert_eq!(parsed, PriceSource::Catalog);
    }

    #[test]
    fn test_product_input_defaults() {
        let input: ProductInput =
            serde_json::from_str(r#"{"sku": "LECHE-1L", "name": "Leche 1L", "price": 28.5}"#).unwrap();
        assert_eq!(input.price_cents, 2850);
        assert_eq!(input.stock, 0);
        assert!(input.is_active);
        assert!(input.cost_cents.is_none());
    }
}
