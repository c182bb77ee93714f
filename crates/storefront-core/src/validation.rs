//! # Validation Module
//!
//! Input validation utilities for checkout.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: React storefront                                             │
//! │  ├── Form rules (empty fields, lengths)                                │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: storefront-client (network boundary)                         │
//! │  ├── DTO decoding rejects malformed payloads                           │
//! │  └── THIS MODULE: shared rules for codes, quantities, amounts          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Coupon existence, stock, pricing (authoritative)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT, MAX_CART_ITEMS, MAX_COUPON_CODE_LEN, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Normalizes a coupon code: trims whitespace and upper-cases it.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 32 characters
/// - ASCII letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use storefront_core::validation::normalize_coupon_code;
///
/// assert_eq!(normalize_coupon_code(" save10 ").unwrap(), "SAVE10");
/// assert!(normalize_coupon_code("").is_err());
/// assert!(normalize_coupon_code("10% OFF").is_err());
/// assert!(normalize_coupon_code("straße").is_err());
/// ```
pub fn normalize_coupon_code(raw: &str) -> ValidationResult<String> {
    let code = raw.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.len() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a non-empty identifier (product id, tier id).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates that a monetary amount is not negative.
///
/// ## Example
/// ```rust
/// use storefront_core::money::Money;
/// use storefront_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", Money::from_cents(0)).is_ok());
/// assert!(validate_non_negative("price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an amount taken from outside input.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed MAX_AMOUNT
///
/// ## Example
/// ```rust
/// use storefront_core::money::Money;
/// use storefront_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::from_cents(1999)).is_ok());
/// assert!(validate_amount("price", Money::MAX).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    validate_non_negative(field, amount)?;
    if amount > Money::from_major(MAX_AMOUNT) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Validates a percentage discount value (0 to 100 inclusive).
pub fn validate_percentage(value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "percentage".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct item fits in the cart.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_coupon_code() {
        assert_eq!(normalize_coupon_code("save10").unwrap(), "SAVE10");
        assert_eq!(normalize_coupon_code("  Black_Friday-24 ").unwrap(), "BLACK_FRIDAY-24");

        assert!(normalize_coupon_code("").is_err());
        assert!(normalize_coupon_code("   ").is_err());
        assert!(normalize_coupon_code("has space").is_err());
        assert!(normalize_coupon_code(&"A".repeat(33)).is_err());
        assert!(normalize_coupon_code(&"A".repeat(32)).is_ok());
    }

    #[test]
    fn test_coupon_code_is_ascii_only() {
        // ß upper-cases to SS, which would grow a 32-char code past the limit
        let code = "ß".repeat(32);
        assert!(matches!(
            normalize_coupon_code(&code),
            Err(ValidationError::TooLong { .. }) | Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(normalize_coupon_code("café").is_err());

        let normalized = normalize_coupon_code(&"z".repeat(32)).unwrap();
        assert_eq!(normalized.len(), MAX_COUPON_CODE_LEN);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("price", Money::zero()).is_ok());
        assert!(validate_amount("price", Money::from_major(MAX_AMOUNT)).is_ok());

        assert!(matches!(
            validate_amount("price", Money::from_major(MAX_AMOUNT) + Money::from_cents(1)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_amount("price", Money::from_cents(-1)),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(Decimal::ZERO).is_ok());
        assert!(validate_percentage(Decimal::new(125, 1)).is_ok());
        assert!(validate_percentage(Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_percentage(Decimal::from(101)).is_err());
        assert!(validate_percentage(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("product id", "42").is_ok());
        assert!(validate_id("product id", " ").is_err());
    }
}
