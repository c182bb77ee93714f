//! # Order Totals
//!
//! Composes subtotal, coupon discount and shipping charge into the figures
//! shown on the cart, order-summary and payment screens.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal ──► sanitize (negative → 0)                                   │
//! │     │                                                                   │
//! │     ├──► compute_discount(coupon, subtotal) ──► discount               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  provisional = subtotal − discount   (floored at 0, pre-shipping)      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  select_tier(tiers, provisional) ──► shipping_charge (or 0)            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  total = provisional + shipping_charge                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tiers are matched against the post-discount, pre-shipping amount. Using
//! the grand total would make the tier depend on its own charge.

use tracing::{debug, warn};

use crate::discount::compute_discount;
use crate::money::Money;
use crate::shipping::select_tier;
use crate::types::{Coupon, OrderTotals, ShippingTier};

/// Clamps a negative subtotal to zero, logging the correction.
pub fn sanitize_subtotal(subtotal: Money) -> Money {
    if subtotal.is_negative() {
        warn!(%subtotal, "Negative subtotal clamped to zero");
        return Money::zero();
    }
    subtotal
}

/// Computes order totals from the cart subtotal, candidate tiers and an
/// optional coupon.
///
/// Pure: identical inputs always give identical output.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use storefront_core::money::Money;
/// use storefront_core::totals::compute_totals;
/// use storefront_core::types::{Coupon, CouponCode, ShippingTier};
///
/// let tiers = vec![ShippingTier {
///     id: "flat".into(),
///     name: "Flat".into(),
///     amount: Money::from_major(15),
///     min_amount: Money::zero(),
///     max_amount: Money::from_major(1000),
/// }];
/// let coupon = Coupon::percentage(CouponCode::parse("TEN").unwrap(), Decimal::from(10));
///
/// let totals = compute_totals(Money::from_major(100), &tiers, Some(&coupon));
/// assert_eq!(totals.discount, Money::from_major(10));
/// assert_eq!(totals.shipping_charge, Money::from_major(15));
/// assert_eq!(totals.total, Money::from_major(105));
/// ```
pub fn compute_totals(
    subtotal: Money,
    tiers: &[ShippingTier],
    coupon: Option<&Coupon>,
) -> OrderTotals {
    let subtotal = sanitize_subtotal(subtotal);
    let discount = compute_discount(coupon, subtotal);
    let provisional = subtotal.saturating_sub(discount);

    let tier = select_tier(tiers, provisional);
    let shipping_charge = tier.map(|t| t.amount).unwrap_or_default();

    OrderTotals {
        subtotal,
        discount,
        shipping_charge,
        total: provisional + shipping_charge,
        shipping_tier_id: tier.map(|t| t.id.clone()),
    }
}

// =============================================================================
// Memoizing Calculator
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct TotalsInput {
    subtotal: Money,
    tiers: Vec<ShippingTier>,
    coupon: Option<Coupon>,
}

/// Caches the last computed totals keyed on their inputs.
///
/// A reactive UI recomputes on every dependency change; when nothing
/// relevant changed, the cached snapshot is returned and downstream views
/// can skip re-rendering.
#[derive(Debug, Default, Clone)]
pub struct TotalsCalculator {
    last: Option<(TotalsInput, OrderTotals)>,
    computations: u64,
}

impl TotalsCalculator {
    /// Creates an empty calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns totals for the inputs, recomputing only if they changed.
    pub fn calculate(
        &mut self,
        subtotal: Money,
        tiers: &[ShippingTier],
        coupon: Option<&Coupon>,
    ) -> OrderTotals {
        if let Some((input, totals)) = &self.last {
            if input.subtotal == subtotal
                && input.coupon.as_ref() == coupon
                && input.tiers.as_slice() == tiers
            {
                return totals.clone();
            }
        }

        let totals = compute_totals(subtotal, tiers, coupon);
        self.computations += 1;
        debug!(
            subtotal = %totals.subtotal,
            discount = %totals.discount,
            shipping = %totals.shipping_charge,
            total = %totals.total,
            "Order totals recomputed"
        );

        self.last = Some((
            TotalsInput {
                subtotal,
                tiers: tiers.to_vec(),
                coupon: coupon.cloned(),
            },
            totals.clone(),
        ));
        totals
    }

    /// The most recent totals, if any were computed.
    pub fn last(&self) -> Option<&OrderTotals> {
        self.last.as_ref().map(|(_, totals)| totals)
    }

    /// Number of real recomputations (cache misses).
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Drops the cached snapshot.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
