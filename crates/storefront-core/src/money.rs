//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Integer cents fix addition, but a 12.5% coupon on $0.99 is            │
//! │  $0.12375, and rounding it before adding shipping drifts the total.   │
//! │                                                                         │
//! │  OUR SOLUTION: Full-precision decimal, rounded at presentation only    │
//! │    subtotal, discount, shipping stay exact                             │
//! │    rounded() / cents() / Display apply half-away-from-zero at 2 dp     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let doubled = price.multiply_quantity(2);
//! assert_eq!(doubled.to_string(), "21.98");
//!
//! // Subtraction used by checkout math never goes below zero
//! let floor = Money::from_cents(500).saturating_sub(Money::from_cents(900));
//! assert!(floor.is_zero());
//!
//! // Arithmetic saturates at the decimal range instead of panicking
//! assert_eq!(Money::MAX + Money::from_cents(1), Money::MAX);
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use tracing::warn;

use crate::error::{CoreError, CoreResult};

/// Number of fraction digits shown to customers.
pub const DISPLAY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the shop currency.
///
/// ## Design Decisions
/// - **Decimal (not f64)**: exact base-10 arithmetic
/// - **Single field tuple struct**: zero-cost wrapper over `Decimal`
/// - **Transparent serde**: serialized as a decimal string, decoded from
///   either a JSON string or a JSON number
///
/// ## Where Money is Used
/// ```text
/// CartItem.unit_price ──► CartItem.line_total ──► Cart.subtotal
///                                                      │
///        Coupon ──► compute_discount ◄─────────────────┤
///                          │                           │
///                          ▼                           ▼
///                   OrderTotals.discount      ShippingTier bounds
///                          │                           │
///                          └──────► OrderTotals.total ◄┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Largest representable amount. Sums and products clamp here.
    pub const MAX: Money = Money(Decimal::MAX);

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, DISPLAY_SCALE))
    }

    /// Creates a Money value from a whole number of currency units.
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Converts a float coming from an untyped source (a UI field, a legacy
    /// payload) into Money.
    ///
    /// NaN, infinities and negative values become zero and are logged.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert!(Money::from_f64_sanitized(f64::NAN).is_zero());
    /// assert!(Money::from_f64_sanitized(-3.0).is_zero());
    /// assert_eq!(Money::from_f64_sanitized(12.5).cents(), 1250);
    /// ```
    pub fn from_f64_sanitized(value: f64) -> Self {
        if !value.is_finite() {
            warn!(value, "Non-finite amount treated as zero");
            return Money::zero();
        }

        if value < 0.0 {
            warn!(value, "Negative amount clamped to zero");
            return Money::zero();
        }

        match Decimal::try_from(value) {
            Ok(amount) => Money(amount),
            Err(e) => {
                warn!(value, error = %e, "Unrepresentable amount treated as zero");
                Money::zero()
            }
        }
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the amount rounded to cents (presentation only).
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storefront_core::money::Money;
    ///
    /// // 0.12375 → 0.12, 0.125 → 0.13 (half away from zero)
    /// assert_eq!(Money::from_decimal(Decimal::new(12375, 5)).cents(), 12);
    /// assert_eq!(Money::from_decimal(Decimal::new(125, 3)).cents(), 13);
    /// ```
    pub fn cents(&self) -> i64 {
        let mut rounded = self.rounded().0;
        rounded.rescale(DISPLAY_SCALE);
        let mantissa = rounded.mantissa();
        i64::try_from(mantissa).unwrap_or(if mantissa < 0 { i64::MIN } else { i64::MAX })
    }

    /// Returns a copy rounded to exactly [`DISPLAY_SCALE`] digits, so it
    /// serializes as `"15.00"` rather than `"15"`.
    pub fn rounded(&self) -> Self {
        let mut amount = self
            .0
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(DISPLAY_SCALE);
        Money(amount)
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        if self.is_negative() {
            Money::zero()
        } else {
            self
        }
    }

    /// Subtracts, flooring the result at zero.
    ///
    /// Checkout math uses this so a discount can never produce a negative
    /// order total.
    #[inline]
    pub fn saturating_sub(self, other: Money) -> Self {
        (self - other).non_negative()
    }

    /// Adds, returning `None` if the sum leaves the decimal range.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Returns `percent`% of this amount, at full precision.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storefront_core::money::Money;
    ///
    /// let subtotal = Money::from_major(100);
    /// assert_eq!(subtotal.percentage(Decimal::from(10)), Money::from_major(10));
    /// ```
    pub fn percentage(&self, percent: Decimal) -> Self {
        match self.0.checked_mul(percent) {
            Some(scaled) => Money(scaled / Decimal::ONE_HUNDRED),
            None => Money((self.0 / Decimal::ONE_HUNDRED).saturating_mul(percent)),
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount rounded to cents without a currency symbol.
///
/// ## Note
/// The currency symbol is a presentation concern; the CLI and the React
/// storefront add it from configuration.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        f.pad(&format!("{}{}.{:02}", sign, abs / 100, abs % 100))
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|e| CoreError::invalid_amount("money", e.to_string()))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

/// Saturates at [`Money::MAX`].
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
        *self = *self + other;
    }
}

/// Plain subtraction; may go negative. Use [`Money::saturating_sub`] for
/// totals.
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
        *self = *self - other;
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
        assert_eq!(money.amount(), Decimal::new(1099, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
        // Display rounds, the value does not
        let third = Money::from_decimal(Decimal::ONE / Decimal::from(3));
        assert_eq!(third.to_string(), "0.33");
        assert_ne!(third, third.rounded());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let huge = Money::MAX;

        assert_eq!(huge + Money::from_major(1), Money::MAX);
        assert_eq!(huge.multiply_quantity(2), Money::MAX);
        assert_eq!(Money::from_decimal(Decimal::MIN) - huge, Money::from_decimal(Decimal::MIN));
        assert_eq!(huge.checked_add(Money::from_major(1)), None);
        assert!(huge.percentage(Decimal::from(100)) <= huge);

        let mut total = huge;
        total += Money::from_cents(1);
        assert_eq!(total, Money::MAX);
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::from_cents(500);
        let b = Money::from_cents(900);
        assert_eq!(a.saturating_sub(b), Money::zero());
        assert_eq!(b.saturating_sub(a).cents(), 400);
    }

    #[test]
    fn test_percentage_keeps_precision() {
        // 12.5% of 0.99 = 0.12375
        let amount = Money::from_cents(99);
        let pct = amount.percentage(Decimal::new(125, 1));
        assert_eq!(pct.amount(), Decimal::new(12375, 5));
        assert_eq!(pct.cents(), 12);
    }

    #[test]
    fn test_from_f64_sanitized() {
        assert!(Money::from_f64_sanitized(f64::NAN).is_zero());
        assert!(Money::from_f64_sanitized(f64::INFINITY).is_zero());
        assert!(Money::from_f64_sanitized(-0.01).is_zero());
        assert_eq!(Money::from_f64_sanitized(49.99).cents(), 4999);
    }

    #[test]
    fn test_parse() {
        assert_eq!("15.00".parse::<Money>().unwrap(), Money::from_major(15));
        assert_eq!(" 0.5 ".parse::<Money>().unwrap().cents(), 50);
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_serde_accepts_string_and_number() {
        let from_str: Money = serde_json::from_str("\"50.01\"").unwrap();
        let from_num: Money = serde_json::from_str("50.01").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_str.cents(), 5001);
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_cents(100), Money::from_cents(250)]
            .iter()
            .sum();
        assert_eq!(total.cents(), 350);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.non_negative(), Money::zero());
    }
}
