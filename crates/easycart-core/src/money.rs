//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    10.99 * 6 = 65.94000000000001  ❌                                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1099 cents * 6 = 6594 cents  ✅                                      │
//! │                                                                         │
//! │  Percentages are basis points, rounded once per adjustment.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use easycart_core::money::Money;
//!
//! let price: Money = "10.99".parse().unwrap();
//! assert_eq!(price.cents(), 1099);
//!
//! let line = price.multiply_quantity(6);
//! assert_eq!(line.cents(), 6594);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::parse_scaled;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discounts are negative adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Saturating arithmetic**: totals clamp at the i64 bounds instead of
///   wrapping or panicking
///
/// ## Where Money is Used
/// ```text
/// LineItem.price ──► LineItem.subtotal ──┬──► LineItem.total
///                                        │
///                                        └──► Cart.subtotal ──► Cart.total
///
/// Condition.max_value / Condition.minimum ──► pricing gates and caps
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use easycart_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use easycart_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(80).cents(), 8000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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
        Money(self.0.saturating_abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use easycart_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns the magnitude of `bps` basis points of this amount.
    ///
    /// The result is always non-negative; callers decide the sign. Halves
    /// round away from zero: `(|amount| * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use easycart_core::money::Money;
    ///
    /// let subtotal = Money::from_units(1200);
    /// assert_eq!(subtotal.percentage_magnitude(5000).cents(), 60000); // 50%
    ///
    /// // 8.25% of 10.00 = 0.825 → 0.83
    /// assert_eq!(Money::from_cents(1000).percentage_magnitude(825).cents(), 83);
    /// ```
    pub fn percentage_magnitude(&self, bps: i64) -> Money {
        // i128 keeps large carts from overflowing mid-calculation
        let amount = (self.0 as i128).abs() * (bps as i128).abs();
        Money(i64::try_from((amount + 5000) / 10000).unwrap_or(i64::MAX))
    }

    /// Returns this amount with the given sign applied to its magnitude.
    #[inline]
    pub const fn with_sign(&self, negative: bool) -> Self {
        if negative {
            Money(self.0.saturating_abs().saturating_neg())
        } else {
            Money(self.0.saturating_abs())
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a plain two-decimal format.
///
/// ## Note
/// This is for debugging and logs. Currency formatting belongs to the
/// presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

/// Parses decimal strings such as `"10.99"` or `"-5"` into cents.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, "amount").map(|d| Money(d.signed()))
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_parse() {
        assert_eq!("10.99".parse::<Money>().unwrap().cents(), 1099);
        assert_eq!("-5".parse::<Money>().unwrap().cents(), -500);
        assert_eq!("0.5".parse::<Money>().unwrap().cents(), 50);
        assert!("ten".parse::<Money>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_percentage_magnitude_rounds_half_away_from_zero() {
        // 50% of 1200.00
        assert_eq!(Money::from_units(1200).percentage_magnitude(5000), Money::from_units(600));
        // 8.25% of 10.00 = 0.825 → 0.83
        assert_eq!(Money::from_cents(1000).percentage_magnitude(825).cents(), 83);
        // magnitude ignores signs on both sides
        assert_eq!(Money::from_cents(-1000).percentage_magnitude(-1000).cents(), 100);
    }

    #[test]
    fn test_with_sign() {
        assert_eq!(Money::from_cents(80).with_sign(true).cents(), -80);
        assert_eq!(Money::from_cents(-80).with_sign(false).cents(), 80);
    }

    #[test]
    fn test_multiply_quantity() {
        // 10.99 * 6 stays exact in cents
        assert_eq!(Money::from_cents(1099).multiply_quantity(6).cents(), 6594);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(i64::MAX / 2);
        assert_eq!(big.multiply_quantity(3).cents(), i64::MAX);
        assert_eq!((big + big + big).cents(), i64::MAX);
        assert_eq!((-big - big - big).cents(), i64::MIN);
        assert_eq!(Money::from_cents(i64::MIN).abs().cents(), i64::MAX);
    }
}
