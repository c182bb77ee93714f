//! # storefront-db: Local Cart Storage
//!
//! Persists the customer's cart across sessions using SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  CheckoutSession (storefront-client)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │  CartRepository  │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  SQLite / memory │   │ (embedded)  │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  storefront.db (carts table)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - `CartRepository` and its implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{CartRepository, Database, DbConfig, GUEST_CART_KEY};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let carts = db.carts(GUEST_CART_KEY);
//! let cart = carts.get().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::SqliteCartRepository;
pub use repository::memory::InMemoryCartRepository;
pub use repository::{CartRepository, GUEST_CART_KEY};
