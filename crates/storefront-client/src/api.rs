//! # Storefront API
//!
//! The three REST calls checkout depends on, behind a trait so the
//! session can be driven by a fake in tests.
//!
//! ## Endpoints
//! ```text
//! GET  /shipping-charges      → [ShippingChargeDto] | { data: [...] }
//! POST /coupons/validate      { code } → { discount, type }
//! POST /orders                OrderRequest → { id, status }
//! ```
//!
//! ## Status Mapping
//! ```text
//! 401 → Unauthorized     403 → Forbidden     404 → NotFound
//! 400 / 422 → Validation  5xx / other → Server { status, message }
//! ```
//! `validate_coupon` turns 400/404/422 into `InvalidCoupon`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::dto::{
    CouponValidateRequest, CouponValidationDto, OrderRequest, OrderResponse, PlacedOrder,
    ShippingChargesResponse,
};
use crate::error::{ClientError, ClientResult};
use storefront_core::{Coupon, CouponCode, ShippingTier};

/// Remote operations used by checkout.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Active shipping tiers, in server order.
    async fn shipping_tiers(&self) -> ClientResult<Vec<ShippingTier>>;

    /// Looks up a coupon. Unknown codes yield [`ClientError::InvalidCoupon`].
    async fn validate_coupon(&self, code: &CouponCode) -> ClientResult<Coupon>;

    /// Submits an order.
    async fn submit_order(&self, order: &OrderRequest) -> ClientResult<PlacedOrder>;
}

/// Error body shapes the backend is known to use.
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default, alias = "error", alias = "detail")]
    message: Option<String>,
}

/// Maps a non-success status and its body to a [`ClientError`].
fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(message)
        }
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

/// `reqwest`-backed [`StorefrontApi`].
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStorefrontApi {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpStorefrontApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Builds a client from configuration, including its bearer token.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let mut api = Self::new(&config.api.base_url, config.timeout())?;
        api.token = config.api.token.clone();
        Ok(api)
    }

    /// Sets the bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let mut req = self.client.get(&url);
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!(%url, "POST");
        let mut req = self.client.post(&url).json(body);
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(error_for_status(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn shipping_tiers(&self) -> ClientResult<Vec<ShippingTier>> {
        let resp: ShippingChargesResponse = self.get("shipping-charges").await?;
        let tiers = resp.into_tiers()?;
        debug!(count = tiers.len(), "Fetched shipping tiers");
        Ok(tiers)
    }

    async fn validate_coupon(&self, code: &CouponCode) -> ClientResult<Coupon> {
        let body = CouponValidateRequest {
            code: code.as_str(),
        };
        let result: ClientResult<CouponValidationDto> = self.post("coupons/validate", &body).await;

        match result {
            Ok(dto) => dto.into_coupon(code.clone()),
            Err(ClientError::NotFound(_)) | Err(ClientError::Validation(_)) => {
                debug!(code = %code, "Coupon rejected by server");
                Err(ClientError::InvalidCoupon {
                    code: code.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn submit_order(&self, order: &OrderRequest) -> ClientResult<PlacedOrder> {
        let resp: OrderResponse = self.post("orders", order).await.map_err(|e| {
            error!(reference = %order.client_reference, error = %e, "Order submission failed");
            e
        })?;
        let placed = PlacedOrder::from(resp);
        info!(
            order_id = %placed.id,
            reference = %order.client_reference,
            "Order accepted"
        );
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = HttpStorefrontApi::new("https://shop.example.com/api/", Duration::from_secs(5))
            .unwrap();
        assert_eq!(api.base_url(), "https://shop.example.com/api");
        assert_eq!(
            api.url("/shipping-charges"),
            "https://shop.example.com/api/shipping-charges"
        );
        assert_eq!(
            api.url("coupons/validate"),
            "https://shop.example.com/api/coupons/validate"
        );
    }

    #[test]
    fn test_auth_header() {
        let api = HttpStorefrontApi::new("http://localhost", Duration::from_secs(5)).unwrap();
        assert!(api.auth_header().is_none());

        let api = api.with_token("abc");
        assert_eq!(api.auth_header().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, r#"{"message": "Coupon not found"}"#),
            ClientError::NotFound(m) if m == "Coupon not found"
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error": "expired"}"#),
            ClientError::Validation(m) if m == "expired"
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, "upstream down"),
            ClientError::Server { status: 502, message } if message == "upstream down"
        ));
    }
}
