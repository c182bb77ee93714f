//! # Client Error Types
//!
//! Error types for everything that leaves the process: REST calls, the
//! persisted cart, configuration and session tokens.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │   Server        │  │   Boundary decoding     │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Http           │  │  Unauthorized   │  │  InvalidResponse        │ │
//! │  │                 │  │  Forbidden      │  │  Serialization          │ │
//! │  │                 │  │  NotFound       │  │                         │ │
//! │  │                 │  │  Server         │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Checkout      │  │   Local         │  │   Session               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidCoupon  │  │  Db             │  │  InvalidToken           │ │
//! │  │  EmptyCart      │  │  Core           │  │  SessionExpired         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the checkout session and API client.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// Missing or rejected bearer token.
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by the server.
    #[error("Request rejected: {0}")]
    Validation(String),

    /// Server-side failure.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    // =========================================================================
    // Boundary Decoding Errors
    // =========================================================================
    /// The server answered with a payload we refuse to use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON encoding/decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // Checkout Errors
    // =========================================================================
    /// The coupon code was not accepted. Prior totals stay unchanged.
    #[error("Invalid coupon code: {code}")]
    InvalidCoupon { code: String },

    /// An order was placed with nothing in the cart.
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Cart storage failed.
    #[error("Cart storage error: {0}")]
    Db(#[from] DbError),

    /// Domain rule violated (cart limits, invalid amounts).
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Token could not be decoded.
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// Session token has expired.
    #[error("Session expired")]
    SessionExpired,
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<jsonwebtoken::errors::Error> for ClientError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => ClientError::SessionExpired,
            _ => ClientError::InvalidToken(err.to_string()),
        }
    }
}

impl ClientError {
    /// Message suitable for a toast in the storefront UI.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::InvalidCoupon { .. } => "Invalid coupon code".to_string(),
            ClientError::EmptyCart => "Your cart is empty".to_string(),
            ClientError::Unauthorized | ClientError::SessionExpired => {
                "Please sign in again".to_string()
            }
            ClientError::Http(_) => "Network error, please try again".to_string(),
            ClientError::Core(e) => e.to_string(),
            _ => "Something went wrong, please try again".to_string(),
        }
    }

    /// Returns true if the user must sign in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized | ClientError::SessionExpired | ClientError::InvalidToken(_)
        )
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors from loading or validating [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written.
    #[error("Failed to save config: {0}")]
    Save(String),

    /// A value failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Save(err.to_string())
    }
}

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_coupon_message() {
        let err = ClientError::InvalidCoupon {
            code: "BOGUS".into(),
        };
        assert_eq!(err.user_message(), "Invalid coupon code");
        assert_eq!(err.to_string(), "Invalid coupon code: BOGUS");
    }

    #[test]
    fn test_auth_errors() {
        assert!(ClientError::Unauthorized.is_auth_error());
        assert!(ClientError::SessionExpired.is_auth_error());
        assert!(!ClientError::EmptyCart.is_auth_error());
    }

    #[test]
    fn test_validation_error_wraps_core() {
        let err: ClientError = ValidationError::Required {
            field: "coupon code".into(),
        }
        .into();
        assert!(matches!(err, ClientError::Core(CoreError::Validation(_))));
    }
}
