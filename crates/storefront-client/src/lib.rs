//! # storefront-client: Checkout Session & API Client
//!
//! Wires the pure checkout math in `storefront-core` to the storefront REST
//! API and the persisted cart.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Checkout                              │
//! │                                                                         │
//! │  checkout CLI / UI event handlers                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                storefront-client (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │  CheckoutSession ──► StorefrontApi (reqwest) ──► REST backend   │   │
//! │  │        │                                                        │   │
//! │  │        ├──► CartRepository (storefront-db)                      │   │
//! │  │        └──► TotalsCalculator (storefront-core)                  │   │
//! │  │                                                                 │   │
//! │  │  ClientConfig (TOML + env)     SessionToken (JWT expiry)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`api`] - `StorefrontApi` trait and its HTTP implementation
//! - [`checkout`] - `CheckoutSession`
//! - [`config`] - `ClientConfig` loading
//! - [`dto`] - Wire types and boundary validation
//! - [`generation`] - Stale-response protection
//! - [`session`] - Session token decoding and expiry watching
//! - [`error`] - Client error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod checkout;
pub mod config;
pub mod dto;
pub mod error;
pub mod generation;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{HttpStorefrontApi, StorefrontApi};
pub use checkout::CheckoutSession;
pub use config::ClientConfig;
pub use dto::{OrderLine, OrderRequest, PlacedOrder};
pub use error::{ClientError, ClientResult, ConfigError};
pub use generation::{Applied, RequestGeneration, Ticket};
pub use session::{extract_bearer_token, watch_expiry, SessionStatus, SessionToken};
