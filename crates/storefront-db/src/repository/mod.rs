//! # Repository Module
//!
//! Cart persistence behind an injectable trait.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Persistence                                     │
//! │                                                                         │
//! │  CheckoutSession                                                        │
//! │       │                                                                 │
//! │       │  carts.get() / carts.set(&cart) / carts.clear()                 │
//! │       ▼                                                                 │
//! │  Arc<dyn CartRepository>                                                │
//! │  ├── SqliteCartRepository    ← carts table, one row per owner key       │
//! │  └── InMemoryCartRepository  ← tests and throwaway sessions             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteCartRepository`](cart::SqliteCartRepository) - SQLite-backed cart
//! - [`InMemoryCartRepository`](memory::InMemoryCartRepository) - process-local cart

pub mod cart;
pub mod memory;

use async_trait::async_trait;
use storefront_core::Cart;

use crate::error::DbResult;

/// Owner key for carts that are not tied to a signed-in user.
pub const GUEST_CART_KEY: &str = "guest";

/// Loads and stores the cart for one owner.
///
/// A repository is bound to its owner key at construction, so callers only
/// ever see "the" cart.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Returns the stored cart, or an empty cart if nothing is stored.
    async fn get(&self) -> DbResult<Cart>;

    /// Replaces the stored cart.
    async fn set(&self, cart: &Cart) -> DbResult<()>;

    /// Removes the stored cart.
    async fn clear(&self) -> DbResult<()>;
}
