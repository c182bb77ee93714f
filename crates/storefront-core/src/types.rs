//! # Domain Types
//!
//! Checkout types shared by the calculator, the cart store and the API
//! client.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Types                                  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ShippingTier   │   │     Coupon      │   │   OrderTotals   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  code           │   │  subtotal       │       │
//! │  │  amount         │   │  discount_type  │   │  discount       │       │
//! │  │  min_amount     │   │  discount_value │   │  shipping_charge│       │
//! │  │  max_amount     │   └─────────────────┘   │  total          │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                        ┌─────────────────┐                              │
//! │                        │  DiscountType   │                              │
//! │                        │  Percentage     │                              │
//! │                        │  Fixed          │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tiers and coupons are owned by the backend. This crate only reads them;
//! the client crate decodes them from the wire and hands them over already
//! validated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::normalize_coupon_code;

// =============================================================================
// Shipping Tier
// =============================================================================

/// A shipping-charge rule active within an order-amount range.
///
/// Bounds are inclusive on both ends. A tier with `min_amount > max_amount`
/// is kept as-is and simply never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingTier {
    /// Backend identifier (numeric ids are carried as strings).
    pub id: String,

    /// Display name, e.g. "Standard" or "Free over 1000".
    pub name: String,

    /// Flat charge applied when this tier matches.
    #[ts(as = "String")]
    pub amount: Money,

    /// Lowest order amount this tier covers.
    #[ts(as = "String")]
    pub min_amount: Money,

    /// Highest order amount this tier covers.
    #[ts(as = "String")]
    pub max_amount: Money,
}

impl ShippingTier {
    /// Checks whether `amount` falls inside this tier's bounds.
    #[inline]
    pub fn covers(&self, amount: Money) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }

    /// A tier whose lower bound exceeds its upper bound.
    #[inline]
    pub fn is_malformed(&self) -> bool {
        self.min_amount > self.max_amount
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` percent of the subtotal.
    Percentage,
    /// `discount_value` in currency units.
    Fixed,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountType::Percentage => write!(f, "percentage"),
            DiscountType::Fixed => write!(f, "fixed"),
        }
    }
}

/// A coupon code, trimmed and upper-cased.
///
/// Codes are case-insensitive: `save10`, ` Save10 ` and `SAVE10` are the
/// same coupon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalizes and validates a user-entered code.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        normalize_coupon_code(raw).map(CouponCode)
    }

    /// Returns the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CouponCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CouponCode::parse(&value)
    }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self {
        code.0
    }
}

/// A server-validated discount descriptor applied once per order.
///
/// ## Lifecycle
/// ```text
/// user types "save10"
///      │
///      ▼
/// CouponCode::parse → "SAVE10"
///      │
///      ▼
/// POST /coupons/validate  (storefront-client)
///      │
///      ▼
/// Coupon { SAVE10, Percentage, 10 }  ← THIS TYPE
///      │
///      ▼
/// compute_discount(Some(&coupon), subtotal)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    #[ts(as = "String")]
    pub code: CouponCode,
    pub discount_type: DiscountType,
    #[ts(as = "String")]
    pub discount_value: Decimal,
}

impl Coupon {
    /// Creates a percentage coupon.
    pub fn percentage(code: CouponCode, percent: Decimal) -> Self {
        Coupon {
            code,
            discount_type: DiscountType::Percentage,
            discount_value: percent,
        }
    }

    /// Creates a fixed-amount coupon.
    pub fn fixed(code: CouponCode, amount: Money) -> Self {
        Coupon {
            code,
            discount_type: DiscountType::Fixed,
            discount_value: amount.amount(),
        }
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Derived checkout totals. Never persisted; recomputed on every input
/// change.
///
/// Amounts keep full precision. Call [`OrderTotals::rounded`] right before
/// showing them or sending them to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    #[ts(as = "String")]
    pub subtotal: Money,
    #[ts(as = "String")]
    pub discount: Money,
    #[ts(as = "String")]
    pub shipping_charge: Money,
    #[ts(as = "String")]
    pub total: Money,
    /// The tier that produced `shipping_charge`, if any matched.
    pub shipping_tier_id: Option<String>,
}

impl OrderTotals {
    /// Totals for an empty order.
    pub fn empty() -> Self {
        OrderTotals {
            subtotal: Money::zero(),
            discount: Money::zero(),
            shipping_charge: Money::zero(),
            total: Money::zero(),
            shipping_tier_id: None,
        }
    }

    /// Presentation snapshot with every amount rounded to cents.
    ///
    /// The total is rebuilt from the rounded parts so the figures on screen
    /// and in the order payload add up. It can differ from
    /// `self.total.rounded()` by a cent.
    pub fn rounded(&self) -> Self {
        let subtotal = self.subtotal.rounded();
        let discount = self.discount.rounded();
        let shipping_charge = self.shipping_charge.rounded();

        OrderTotals {
            subtotal,
            discount,
            shipping_charge,
            total: subtotal.saturating_sub(discount) + shipping_charge,
            shipping_tier_id: self.shipping_tier_id.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
