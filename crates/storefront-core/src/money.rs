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
//! │  OUR SOLUTION: Integer minor units (paise)                              │
//! │    ₹34.99 is stored as 3499 and every order total is an exact sum      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(3499); // ₹34.99
//! let line = price.multiply_quantity(2).unwrap();
//! assert_eq!(line.cents(), 6998);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// A monetary value in the smallest currency unit.
///
/// Every price, line total and order total in the storefront is a `Money`
/// (or its raw `i64` when crossing the database boundary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Fails with `AmountOverflow` instead of wrapping.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1299);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap().cents(), 3897);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Self> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    #[inline]
    pub fn checked_add(&self, other: Money) -> CoreResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display is for logs and debugging; the SPA formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.major().abs(), self.minor())
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

/// Saturates at the `i64` bounds; order totals go through `multiply_quantity`.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(3499);
        assert_eq!(money.cents(), 3499);
        assert_eq!(money.major(), 34);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3499).to_string(), "₹34.99");
        assert_eq!(Money::from_cents(500).to_string(), "₹5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert!((b - a).is_negative());
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_cents(100_000_000_000_000_000);

        assert!(matches!(
            price.multiply_quantity(99),
            Err(CoreError::AmountOverflow)
        ));
        assert_eq!(price.multiply_quantity(1).unwrap(), price);
        assert!(matches!(
            Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)),
            Err(CoreError::AmountOverflow)
        ));
        assert_eq!((Money::from_cents(i64::MAX) * 2).cents(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let total: Money = [1299, 1899, 2]
            .iter()
            .map(|c| Money::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 3200);

        let empty: Money = std::iter::empty().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(4599)).unwrap();
        assert_eq!(json, "4599");
    }
}
