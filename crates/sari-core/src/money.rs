//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A week of ₱18.50 noodle sales summed as f64 drifts by centavos,        │
//! │  and the dashboard shows a daily total that no receipt adds up to.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    ₱18.50 is stored as 1850. Addition is exact. Every aggregation       │
//! │    bucket in the analytics engine sums these integers.                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sari_core::money::Money;
//!
//! // Create from centavos (preferred)
//! let price = Money::from_centavos(1850); // ₱18.50
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // ₱37.00
//! let total = price + Money::from_pesos(5);      // ₱23.50
//!
//! // NEVER do this:
//! // let bad = Money::from_float(18.50); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (the smallest peso unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Product.unit_price ──► CartItem.unit_price ──► SaleItem.line_total
///                                                      │
///            DailySummary.total_sales ◄── aggregation ◄┘
///                                                      │
///            CreditObligation.amount ◄── utang checkout┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let price = Money::from_centavos(1850); // Represents ₱18.50
    /// assert_eq!(price.centavos(), 1850);
    /// ```
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let limit = Money::from_pesos(1000); // ₱1,000.00
    /// assert_eq!(limit.centavos(), 100_000);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// assert_eq!(Money::from_centavos(1850).pesos(), 18);
    /// assert_eq!(Money::from_centavos(-550).pesos(), -5);
    /// ```
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Subtracts, clamping the result at zero.
    ///
    /// Used where a negative result is meaningless, such as remaining
    /// credit headroom (`credit_limit - outstanding_balance`).
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let limit = Money::from_pesos(500);
    /// let owed = Money::from_pesos(650);
    /// assert_eq!(limit.saturating_sub(owed), Money::zero());
    /// ```
    #[inline]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let unit_price = Money::from_centavos(2500); // ₱25.00 Coca-Cola
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.centavos(), 7500); // ₱75.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Use frontend formatting for actual
/// UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₱{}.{:02}",
            sign,
            self.pesos().abs(),
            self.centavos_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation over iterators of Money.
///
/// The aggregation engine folds bucket totals with `.sum()`.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centavos() {
        let money = Money::from_centavos(1850);
        assert_eq!(money.centavos(), 1850);
        assert_eq!(money.pesos(), 18);
        assert_eq!(money.centavos_part(), 50);
    }

    #[test]
    fn test_from_pesos() {
        assert_eq!(Money::from_pesos(1000).centavos(), 100_000);
        assert_eq!(Money::from_pesos(-5).centavos(), -500);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_centavos(1850)), "₱18.50");
        assert_eq!(format!("{}", Money::from_centavos(500)), "₱5.00");
        assert_eq!(format!("{}", Money::from_centavos(-550)), "-₱5.50");
        assert_eq!(format!("{}", Money::from_centavos(0)), "₱0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_centavos(1000);
        let b = Money::from_centavos(500);

        assert_eq!((a + b).centavos(), 1500);
        assert_eq!((a - b).centavos(), 500);
        let result: Money = a * 3;
        assert_eq!(result.centavos(), 3000);
    }

    #[test]
    fn test_saturating_sub() {
        let limit = Money::from_pesos(500);
        let small = Money::from_pesos(100);
        assert_eq!(limit.saturating_sub(small), Money::from_pesos(400));
        assert_eq!(small.saturating_sub(limit), Money::zero());
    }

    #[test]
    fn test_sum() {
        let totals = vec![
            Money::from_centavos(2500),
            Money::from_centavos(1800),
            Money::from_centavos(1200),
        ];
        let sum: Money = totals.iter().sum();
        assert_eq!(sum.centavos(), 5500);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert_eq!(empty, Money::zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_centavos(100);
        assert!(positive.is_positive());

        let negative = Money::from_centavos(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_centavos(2200); // ₱22 Royal
        let line_total = unit_price.multiply_quantity(4);
        assert_eq!(line_total.centavos(), 8800);
    }
}
