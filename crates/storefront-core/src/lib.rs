//! # storefront-core: Pure Checkout Logic
//!
//! This crate holds the storefront's checkout math as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Checkout Architecture                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                React storefront / checkout CLI                  │   │
//! │  │       Cart ──► Order Summary ──► Checkout ──► Payment           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          storefront-client (CheckoutSession, REST API)          │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼──────────────────┐   │
//! │  │  ★ storefront-core (THIS) ★     │  │  storefront-db            │   │
//! │  │                                 │  │  CartRepository (SQLite)  │   │
//! │  │  money  shipping  discount      │  └───────────────────────────┘   │
//! │  │  totals  cart  validation       │                                   │
//! │  │                                 │                                   │
//! │  │  NO I/O • NO NETWORK • PURE     │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Decimal `Money`, rounded only for presentation
//! - [`types`] - `ShippingTier`, `Coupon`, `OrderTotals`
//! - [`shipping`] - First-match shipping tier selection
//! - [`discount`] - Percentage / fixed coupon discounts
//! - [`totals`] - Order totals and the memoizing `TotalsCalculator`
//! - [`cart`] - Cart line items and subtotal
//! - [`validation`] - Shared input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{compute_totals, Money};
//!
//! let totals = compute_totals(Money::from_major(50), &[], None);
//! assert_eq!(totals.total.to_string(), "50.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod shipping;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use discount::compute_discount;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use shipping::{select_tier, shipping_charge_for};
pub use totals::{compute_totals, TotalsCalculator};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct items allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in the cart.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum length of a coupon code.
pub const MAX_COUPON_CODE_LEN: usize = 32;

/// Largest amount, in whole currency units, accepted from outside input
/// (prices, subtotals, tier bounds, coupon values).
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
