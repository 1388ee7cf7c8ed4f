//! # mostrador-core: Pure Business Logic for Mostrador
//!
//! This crate holds the domain of the Mostrador point-of-sale service as
//! pure functions and plain data, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mostrador Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser dashboard (forms + cart)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  mostrador-api (axum routes)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ mostrador-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ SaleDraft │  │   rules   │  │   │
//! │  │   │  Sale     │  │  TaxRate  │  │  totals   │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  mostrador-db (Database Layer)                  │   │
//! │  │         SQLite pool, migrations, repositories, reports          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Client, Provider, Sale, report rows)
//! - [`money`] - Money type with integer arithmetic
//! - [`checkout`] - Sale request validation and totals
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use mostrador_core::money::Money;
//! use mostrador_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(2500); // $25.00
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1600)); // 16% IVA
//! assert_eq!(tax.cents(), 400);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{LineItemRequest, SaleDraft, SaleLine, SaleRequest, SaleTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default sales tax (IVA) in basis points: 1600 = 16%.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1600;

/// Maximum number of line items in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// Guards against typing 1000 instead of 10 at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest stock level a product may hold.
///
/// Keeps `stock + delta` far from integer overflow in SQLite.
pub const MAX_STOCK: i64 = 1_000_000_000;

/// Upper bound for list endpoints.
pub const MAX_PAGE_SIZE: u32 = 500;
