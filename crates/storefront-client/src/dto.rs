//! # Wire DTOs
//!
//! Request and response shapes of the storefront REST API, and their
//! conversion into validated domain types.
//!
//! ## Boundary Rule
//! ```text
//! JSON from server ──► *Dto (loose: numbers or strings) ──► validate ──► domain type
//!                                                              │
//!                                                              └─► ClientError::InvalidResponse
//! ```
//! Nothing past this module ever sees a raw server payload.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use storefront_core::validation::{validate_amount, validate_percentage};
use storefront_core::{Coupon, CouponCode, DiscountType, Money, OrderTotals, ShippingTier};

// =============================================================================
// Loose Scalars
// =============================================================================

/// An amount the server may send as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireAmount {
    Number(serde_json::Number),
    Text(String),
}

impl WireAmount {
    /// Parses into a non-negative [`Money`] no larger than
    /// [`storefront_core::MAX_AMOUNT`].
    pub fn to_money(&self, field: &str) -> ClientResult<Money> {
        let value = self.to_decimal(field)?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ClientError::InvalidResponse(format!(
                "{} must not be negative, got {}",
                field, value
            )));
        }

        let amount = Money::from_decimal(value);
        validate_amount(field, amount)
            .map_err(|e| ClientError::InvalidResponse(format!("{}, got {}", e, value)))?;
        Ok(amount)
    }

    fn to_decimal(&self, field: &str) -> ClientResult<Decimal> {
        let raw = match self {
            WireAmount::Number(n) => n.to_string(),
            WireAmount::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| {
                ClientError::InvalidResponse(format!("{} is not a number: {:?}", field, raw))
            })
    }
}

/// An identifier the server may send as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

// =============================================================================
// GET /shipping-charges
// =============================================================================

/// One row of `GET /shipping-charges`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingChargeDto {
    pub id: WireId,
    #[serde(default)]
    pub name: String,
    pub amount: WireAmount,
    pub min_amount: WireAmount,
    pub max_amount: WireAmount,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ShippingChargeDto {
    /// Converts to a tier. Inactive rows yield `None`.
    ///
    /// `min_amount > max_amount` is accepted here; such a tier never
    /// matches during selection.
    pub fn into_tier(self) -> ClientResult<Option<ShippingTier>> {
        if !self.is_active {
            return Ok(None);
        }

        let id = self.id.into_string();
        if id.trim().is_empty() {
            return Err(ClientError::InvalidResponse(
                "shipping charge without id".into(),
            ));
        }

        Ok(Some(ShippingTier {
            amount: self.amount.to_money("amount")?,
            min_amount: self.min_amount.to_money("min_amount")?,
            max_amount: self.max_amount.to_money("max_amount")?,
            name: self.name,
            id,
        }))
    }
}

/// The list endpoint answers either with a bare array or `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShippingChargesResponse {
    List(Vec<ShippingChargeDto>),
    Wrapped { data: Vec<ShippingChargeDto> },
}

impl ShippingChargesResponse {
    /// Active tiers in server order.
    pub fn into_tiers(self) -> ClientResult<Vec<ShippingTier>> {
        let rows = match self {
            ShippingChargesResponse::List(rows) => rows,
            ShippingChargesResponse::Wrapped { data } => data,
        };

        let mut tiers = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(tier) = row.into_tier()? {
                tiers.push(tier);
            }
        }
        Ok(tiers)
    }
}

// =============================================================================
// POST /coupons/validate
// =============================================================================

/// Body of `POST /coupons/validate`.
#[derive(Debug, Clone, Serialize)]
pub struct CouponValidateRequest<'a> {
    pub code: &'a str,
}

/// Success body of `POST /coupons/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponValidationDto {
    pub discount: WireAmount,
    #[serde(rename = "type", alias = "discount_type")]
    pub discount_type: String,
}

impl CouponValidationDto {
    /// Builds the validated [`Coupon`] for `code`.
    pub fn into_coupon(self, code: CouponCode) -> ClientResult<Coupon> {
        let discount_type = match self.discount_type.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" => DiscountType::Percentage,
            "fixed" => DiscountType::Fixed,
            other => {
                return Err(ClientError::InvalidResponse(format!(
                    "unknown discount type: {:?}",
                    other
                )))
            }
        };

        let value = self.discount.to_money("discount")?;

        match discount_type {
            DiscountType::Percentage => {
                validate_percentage(value.amount())
                    .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
                Ok(Coupon::percentage(code, value.amount()))
            }
            DiscountType::Fixed => Ok(Coupon::fixed(code, value)),
        }
    }
}

// =============================================================================
// POST /orders
// =============================================================================

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Body of `POST /orders`.
///
/// Amounts are the rounded totals the customer was shown, so
/// `subtotal - discount + shipping_charge == total` holds on the wire. The
/// backend re-prices and is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Client-generated reference for correlating logs with the backend.
    pub client_reference: Uuid,
    pub items: Vec<OrderLine>,
    pub coupon_code: Option<String>,
    pub shipping_charge_id: Option<String>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_charge: Money,
    pub total: Money,
}

impl OrderRequest {
    /// Builds a request from cart lines, the applied coupon and totals.
    pub fn new(items: Vec<OrderLine>, coupon: Option<&Coupon>, totals: &OrderTotals) -> Self {
        let shown = totals.rounded();
        OrderRequest {
            client_reference: Uuid::new_v4(),
            items,
            coupon_code: coupon.map(|c| c.code.to_string()),
            shipping_charge_id: shown.shipping_tier_id,
            subtotal: shown.subtotal,
            discount: shown.discount,
            shipping_charge: shown.shipping_charge,
            total: shown.total,
        }
    }
}

/// Response body of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub id: WireId,
    #[serde(default)]
    pub status: Option<String>,
}

/// An order the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: String,
    pub status: String,
}

impl From<OrderResponse> for PlacedOrder {
    fn from(resp: OrderResponse) -> Self {
        PlacedOrder {
            id: resp.id.into_string(),
            status: resp.status.unwrap_or_else(|| "pending".to_string()),
        }
    }
}
