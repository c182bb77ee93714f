//! # Shipping Tier Matching
//!
//! Picks the shipping-charge tier that applies to an order amount.
//!
//! ## Matching Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tiers (backend order)          amount = 60.00                          │
//! │                                                                         │
//! │  [0] Standard   0.00 ..=   50.00   → 60 > 50, skip                     │
//! │  [1] Reduced   50.01 ..= 1000.00   → MATCH, charge 10.00               │
//! │  [2] Overlap   40.00 ..=  100.00   → never reached (first match wins)  │
//! │                                                                         │
//! │  No tier covers the amount  →  None  →  shipping charge 0              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overlapping tiers are not rejected; list order is the only tie-break.
//! A tier with `min_amount > max_amount` never matches and is skipped
//! silently.

use tracing::trace;

use crate::money::Money;
use crate::types::ShippingTier;

/// Returns the first tier in `tiers` whose inclusive bounds cover `amount`.
///
/// ## Example
/// ```rust
/// use storefront_core::money::Money;
/// use storefront_core::shipping::select_tier;
/// use storefront_core::types::ShippingTier;
///
/// let tiers = vec![ShippingTier {
///     id: "std".into(),
///     name: "Standard".into(),
///     amount: Money::from_major(5),
///     min_amount: Money::zero(),
///     max_amount: Money::from_major(50),
/// }];
///
/// assert_eq!(select_tier(&tiers, Money::from_major(30)).map(|t| t.id.as_str()), Some("std"));
/// assert!(select_tier(&tiers, Money::from_major(51)).is_none());
/// assert!(select_tier(&[], Money::zero()).is_none());
/// ```
pub fn select_tier(tiers: &[ShippingTier], amount: Money) -> Option<&ShippingTier> {
    let selected = tiers.iter().find(|tier| tier.covers(amount));

    trace!(
        %amount,
        candidates = tiers.len(),
        tier_id = selected.map(|t| t.id.as_str()),
        "Shipping tier lookup"
    );

    selected
}

/// Shipping charge for `amount`: the matching tier's flat amount, or zero.
pub fn shipping_charge_for(tiers: &[ShippingTier], amount: Money) -> Money {
    select_tier(tiers, amount)
        .map(|tier| tier.amount)
        .unwrap_or_default()
}

// =============================================================================
// Unit Tests
// =============================================================================
