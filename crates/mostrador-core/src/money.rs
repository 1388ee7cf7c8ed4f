//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Cents Internally, Decimals on the Wire
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard JSON          Rust / SQLite            Dashboard JSON        │
//! │                                                                         │
//! │  "unitPrice": 10.5  ──►  Money(1050)  ──► ... ──► "total": 29.0        │
//! │                  decimal::deserialize        decimal::serialize         │
//! │                                                                         │
//! │  All arithmetic (line totals, tax, cut sums) happens on i64 cents.     │
//! │  Floats exist only at the JSON boundary and are rounded to the cent    │
//! │  exactly once, on the way in.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::money::Money;
//!
//! let price = Money::from_cents(1000); // $10.00
//! let line = price.checked_multiply_quantity(2).unwrap(); // $20.00
//! assert_eq!((line + Money::from_cents(500)).cents(), 2500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// `i64` is signed so stock adjustments and corrections can be expressed,
/// though sales themselves never carry negative amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount in major units (pesos) to cents.
    ///
    /// Rounds half away from zero to the nearest cent. Returns `None` for
    /// NaN, infinities and values outside the `i64` cent range.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_units(10.5).unwrap().cents(), 1050);
    /// assert_eq!(Money::from_major_units(0.1 + 0.2).unwrap().cents(), 30);
    /// assert!(Money::from_major_units(f64::NAN).is_none());
    /// ```
    pub fn from_major_units(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, so compare with strict bounds
        if cents >= i64::MAX as f64 || cents <= i64::MIN as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in major units, for JSON output only.
    #[inline]
    pub fn major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Calculates tax on this amount.
    ///
    /// ## Implementation
    /// Integer math on basis points: `(amount * bps + 5000) / 10000`.
    /// The +5000 rounds half up (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    /// use mostrador_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2500); // $25.00
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1600));
    /// assert_eq!(tax.cents(), 400); // $4.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large subtotals from overflowing before the division
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies a unit price by a quantity, failing on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_multiply_quantity(3).unwrap().cents(), 897);
    /// assert!(Money::from_cents(i64::MAX).checked_multiply_quantity(2).is_none());
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, failing on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display; the dashboard formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde: cents as decimal numbers
// =============================================================================

/// `#[serde(with = "mostrador_core::money::decimal")]` for `i64` cent fields.
///
/// Serializes `1050` as `10.5` and deserializes any JSON number into cents,
/// rounding to the nearest cent.
pub mod decimal {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(Money::from_cents(*cents).major_units())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_major_units(amount)
            .map(|m| m.cents())
            .ok_or_else(|| D::Error::custom("amount must be a finite number"))
    }

    /// Same as the parent module, for `Option<i64>` fields.
    pub mod option {
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::Money;

        pub fn serialize<S: Serializer>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
            match cents {
                Some(c) => serializer.serialize_some(&Money::from_cents(*c).major_units()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
            match Option::<f64>::deserialize(deserializer)? {
                Some(amount) => Money::from_major_units(amount)
                    .map(|m| Some(m.cents()))
                    .ok_or_else(|| D::Error::custom("amount must be a finite number")),
                None => Ok(None),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
