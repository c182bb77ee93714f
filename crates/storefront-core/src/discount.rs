//! # Coupon Discounts
//!
//! Turns an already-validated coupon into a discount amount.
//!
//! ```text
//! Percentage:  discount = subtotal × value / 100   clamped to [0, subtotal]
//! Fixed:       discount = min(value, subtotal)     clamped to [0, subtotal]
//! No coupon:   discount = 0
//! ```
//!
//! Whether the coupon exists is the backend's call; nothing here talks to
//! the network.

use crate::money::Money;
use crate::types::{Coupon, DiscountType};

/// Computes the discount a coupon grants on `subtotal`.
///
/// The result is always between zero and `subtotal`, so applying it can
/// never push an order total below zero.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use storefront_core::discount::compute_discount;
/// use storefront_core::money::Money;
/// use storefront_core::types::{Coupon, CouponCode};
///
/// let code = CouponCode::parse("SAVE10").unwrap();
/// let coupon = Coupon::percentage(code, Decimal::from(10));
///
/// let discount = compute_discount(Some(&coupon), Money::from_major(100));
/// assert_eq!(discount, Money::from_major(10));
/// assert!(compute_discount(None, Money::from_major(100)).is_zero());
/// ```
pub fn compute_discount(coupon: Option<&Coupon>, subtotal: Money) -> Money {
    let Some(coupon) = coupon else {
        return Money::zero();
    };

    let subtotal = subtotal.non_negative();
    let raw = match coupon.discount_type {
        DiscountType::Percentage => subtotal.percentage(coupon.discount_value),
        DiscountType::Fixed => Money::from_decimal(coupon.discount_value),
    };

    raw.non_negative().min(subtotal)
}

// =============================================================================
// Unit Tests
// =============================================================================
