//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Re-pricing an order on every line change multiplies that drift.        │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Base-10 arithmetic, exact for every amount a till can show.         │
//! │    Percentages are rounded once, to MONEY_DECIMAL_PLACES.              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cafe_core::money::Money;
//!
//! let price = Money::from_major(25_000);
//! let line_total = price.multiply_quantity(2);
//! assert_eq!(line_total, Money::from_major(50_000));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::MONEY_DECIMAL_PLACES;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the shop's single currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: subtraction may go negative before clamping
/// - **Single field tuple struct**: zero-cost wrapper over `Decimal`
/// - **serde transparent**: serialized as the decimal string
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► OrderLine.unit_price (frozen) ──► OrderLine.line_total
///                                                          │
///                                           Order.subtotal ◄┘
///                                                │
///                          Voucher discount ──► Order.total ──► loyalty points
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-unit amount (e.g. `25_000` VND).
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let unit_price = Money::from_major(35_000);
    /// assert_eq!(unit_price.multiply_quantity(3), Money::from_major(105_000));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns `percent`% of this amount, rounded to money precision.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let subtotal = Money::from_major(100_000);
    /// let ten_percent = subtotal.percentage(Decimal::from(10));
    /// assert_eq!(ten_percent, Money::from_major(10_000));
    /// ```
    pub fn percentage(&self, percent: Decimal) -> Money {
        let raw = self.0 * percent / Decimal::ONE_HUNDRED;
        Money(raw.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Clamps negative amounts to zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        if self.is_negative() {
            Money::zero()
        } else {
            self
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount without trailing zeros (`50000`, `12.5`).
///
/// Currency symbols are added by the engine's configuration.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: e.to_string(),
            })
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
