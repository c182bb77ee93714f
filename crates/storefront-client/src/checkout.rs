//! # Checkout Session
//!
//! Everything the order summary, cart and payment step need, in one place:
//! the persisted cart, the live shipping tiers, the applied coupon and the
//! derived totals.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CheckoutSession                                  │
//! │                                                                         │
//! │  add_to_cart / update_quantity / remove_from_cart                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartRepository ──► cart.subtotal() ──┐                                 │
//! │                                       │                                 │
//! │  refresh_tiers ─► [tier ticket] ──► tiers ──► TotalsCalculator ──► totals│
//! │                                       │                                 │
//! │  apply_coupon ──► [coupon ticket] ──► coupon                            │
//! │                                                                         │
//! │  place_order: cart + coupon + totals ──► POST /orders ──► clear cart    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Network calls run without holding any lock, so a coupon lookup and a
//! tier refresh can be in flight together. Each response is applied only
//! if no newer request of the same kind was started meanwhile.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::api::StorefrontApi;
use crate::dto::{OrderLine, OrderRequest, PlacedOrder};
use crate::error::{ClientError, ClientResult};
use crate::generation::{Applied, RequestGeneration};
use storefront_core::{Cart, CartItem, Coupon, CouponCode, OrderTotals, ShippingTier, TotalsCalculator};
use storefront_db::CartRepository;

#[derive(Debug, Default)]
struct SessionState {
    tiers: Vec<ShippingTier>,
    coupon: Option<Coupon>,
    calculator: TotalsCalculator,
}

/// One customer's checkout.
pub struct CheckoutSession {
    api: Arc<dyn StorefrontApi>,
    carts: Arc<dyn CartRepository>,
    state: Mutex<SessionState>,
    /// Serializes read-modify-write of the stored cart.
    cart_lock: Mutex<()>,
    tier_requests: RequestGeneration,
    coupon_requests: RequestGeneration,
}

impl CheckoutSession {
    pub fn new(api: Arc<dyn StorefrontApi>, carts: Arc<dyn CartRepository>) -> Self {
        CheckoutSession {
            api,
            carts,
            state: Mutex::new(SessionState::default()),
            cart_lock: Mutex::new(()),
            tier_requests: RequestGeneration::new("shipping_tiers"),
            coupon_requests: RequestGeneration::new("coupon"),
        }
    }

    // =========================================================================
    // Shipping Tiers
    // =========================================================================

    /// Fetches shipping tiers and, if this is the newest refresh, makes
    /// them current.
    ///
    /// On failure the previous tiers stay in effect.
    pub async fn refresh_tiers(&self) -> ClientResult<Applied<OrderTotals>> {
        let ticket = self.tier_requests.begin();
        let result = self.api.shipping_tiers().await;

        {
            let mut state = self.state.lock().await;
            if !self.tier_requests.is_current(ticket) {
                debug!(
                    kind = self.tier_requests.name(),
                    %ticket,
                    latest = self.tier_requests.current(),
                    "Dropping stale response"
                );
                return Ok(Applied::Stale);
            }
            let tiers = result?;
            debug!(count = tiers.len(), %ticket, "Shipping tiers updated");
            state.tiers = tiers;
        }

        Ok(Applied::Fresh(self.totals().await?))
    }

    pub async fn tiers(&self) -> Vec<ShippingTier> {
        self.state.lock().await.tiers.clone()
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Validates `raw` with the server and applies it.
    ///
    /// A code rejected locally or by the server yields
    /// [`ClientError::InvalidCoupon`] and leaves the current coupon, and so
    /// the totals, unchanged.
    pub async fn apply_coupon(&self, raw: &str) -> ClientResult<Applied<OrderTotals>> {
        let code = CouponCode::parse(raw).map_err(|e| {
            warn!(input = %raw, reason = %e, "Coupon code rejected before lookup");
            ClientError::InvalidCoupon {
                code: raw.trim().to_string(),
            }
        })?;

        let ticket = self.coupon_requests.begin();
        let result = self.api.validate_coupon(&code).await;

        {
            let mut state = self.state.lock().await;
            if !self.coupon_requests.is_current(ticket) {
                debug!(
                    kind = self.coupon_requests.name(),
                    %ticket,
                    latest = self.coupon_requests.current(),
                    code = %code,
                    "Dropping stale response"
                );
                return Ok(Applied::Stale);
            }
            match result {
                Ok(coupon) => {
                    info!(
                        code = %coupon.code,
                        kind = %coupon.discount_type,
                        value = %coupon.discount_value,
                        "Coupon applied"
                    );
                    state.coupon = Some(coupon);
                }
                Err(e) => {
                    warn!(code = %code, error = %e, "Coupon not applied");
                    return Err(e);
                }
            }
        }

        Ok(Applied::Fresh(self.totals().await?))
    }

    /// Removes the applied coupon. Any lookup still in flight is dropped
    /// when it returns.
    pub async fn remove_coupon(&self) -> ClientResult<OrderTotals> {
        self.coupon_requests.invalidate();
        if let Some(coupon) = self.state.lock().await.coupon.take() {
            debug!(code = %coupon.code, "Coupon removed");
        }
        self.totals().await
    }

    pub async fn coupon(&self) -> Option<Coupon> {
        self.state.lock().await.coupon.clone()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub async fn cart(&self) -> ClientResult<Cart> {
        Ok(self.carts.get().await?)
    }

    /// Adds an item (merging with an existing line) and persists the cart.
    pub async fn add_to_cart(&self, item: CartItem) -> ClientResult<Cart> {
        let _guard = self.cart_lock.lock().await;
        let mut cart = self.carts.get().await?;
        cart.add_item(item)?;
        self.carts.set(&cart).await?;
        Ok(cart)
    }

    /// Sets a line's quantity; 0 removes it.
    pub async fn update_quantity(&self, product_id: &str, quantity: u32) -> ClientResult<Cart> {
        let _guard = self.cart_lock.lock().await;
        let mut cart = self.carts.get().await?;
        cart.update_quantity(product_id, quantity)?;
        self.carts.set(&cart).await?;
        Ok(cart)
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> ClientResult<Cart> {
        let _guard = self.cart_lock.lock().await;
        let mut cart = self.carts.get().await?;
        cart.remove_item(product_id)?;
        self.carts.set(&cart).await?;
        Ok(cart)
    }

    pub async fn clear_cart(&self) -> ClientResult<()> {
        let _guard = self.cart_lock.lock().await;
        self.carts.clear().await?;
        Ok(())
    }

    // =========================================================================
    // Totals & Orders
    // =========================================================================

    /// Current totals for the stored cart, tiers and coupon.
    pub async fn totals(&self) -> ClientResult<OrderTotals> {
        let subtotal = self.carts.get().await?.subtotal();
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        Ok(state
            .calculator
            .calculate(subtotal, &state.tiers, state.coupon.as_ref()))
    }

    /// Submits the stored cart as an order.
    ///
    /// The cart is cleared and the coupon consumed only after the backend
    /// accepts the order. On failure nothing changes and the user may try
    /// again.
    ///
    /// Once the backend has accepted, the placed order is always returned.
    /// A cart store that cannot be cleared is logged, and an empty cart is
    /// written in its place.
    pub async fn place_order(&self) -> ClientResult<PlacedOrder> {
        let _guard = self.cart_lock.lock().await;

        let cart = self.carts.get().await?;
        if cart.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        let request = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let totals =
                state
                    .calculator
                    .calculate(cart.subtotal(), &state.tiers, state.coupon.as_ref());
            let lines = cart
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect();
            OrderRequest::new(lines, state.coupon.as_ref(), &totals)
        };

        debug!(
            reference = %request.client_reference,
            items = request.items.len(),
            total = %request.total,
            "Submitting order"
        );

        let placed = self.api.submit_order(&request).await?;

        self.coupon_requests.invalidate();
        {
            let mut state = self.state.lock().await;
            state.coupon = None;
            state.calculator.invalidate();
        }

        if let Err(e) = self.carts.clear().await {
            error!(order_id = %placed.id, error = %e, "Order placed but cart not cleared");
            if let Err(e) = self.carts.set(&Cart::new()).await {
                error!(order_id = %placed.id, error = %e, "Could not empty cart after order");
            }
        }

        info!(order_id = %placed.id, status = %placed.status, "Order placed");
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex as StdMutex;
    use storefront_core::Money;
    use storefront_db::{DbError, DbResult, InMemoryCartRepository};
    use tokio::sync::oneshot;

    // =========================================================================
    // Scripted API
    // =========================================================================

    #[derive(Default)]
    struct FakeApi {
        /// Responses to successive `shipping_tiers` calls; `None` fails.
        tier_responses: StdMutex<VecDeque<(Option<Vec<ShippingTier>>, Option<oneshot::Receiver<()>>)>>,
        coupons: HashMap<String, Coupon>,
        coupon_gates: StdMutex<HashMap<String, oneshot::Receiver<()>>>,
        orders: StdMutex<Vec<OrderRequest>>,
        reject_orders: bool,
    }

    impl FakeApi {
        fn with_coupons(coupons: Vec<Coupon>) -> Self {
            FakeApi {
                coupons: coupons
                    .into_iter()
                    .map(|c| (c.code.to_string(), c))
                    .collect(),
                ..Default::default()
            }
        }

        fn push_tiers(&self, tiers: Option<Vec<ShippingTier>>) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.tier_responses
                .lock()
                .unwrap()
                .push_back((tiers, Some(rx)));
            tx
        }

        fn gate_coupon(&self, code: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.coupon_gates
                .lock()
                .unwrap()
                .insert(code.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl StorefrontApi for FakeApi {
        async fn shipping_tiers(&self) -> ClientResult<Vec<ShippingTier>> {
            let next = self.tier_responses.lock().unwrap().pop_front();
            let (tiers, gate) = next.unwrap_or((Some(Vec::new()), None));
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            tiers.ok_or(ClientError::Server {
                status: 503,
                message: "unavailable".into(),
            })
        }

        async fn validate_coupon(&self, code: &CouponCode) -> ClientResult<Coupon> {
            let gate = self.coupon_gates.lock().unwrap().remove(code.as_str());
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.coupons
                .get(code.as_str())
                .cloned()
                .ok_or_else(|| ClientError::InvalidCoupon {
                    code: code.to_string(),
                })
        }

        async fn submit_order(&self, order: &OrderRequest) -> ClientResult<PlacedOrder> {
            if self.reject_orders {
                return Err(ClientError::Server {
                    status: 500,
                    message: "boom".into(),
                });
            }
            let mut orders = self.orders.lock().unwrap();
            orders.push(order.clone());
            Ok(PlacedOrder {
                id: format!("ord-{}", orders.len()),
                status: "pending".into(),
            })
        }
    }

    /// Reads work; `clear` always fails and `set` can be made to fail.
    struct StuckCartRepository {
        inner: InMemoryCartRepository,
        fail_set: bool,
    }

    #[async_trait]
    impl CartRepository for StuckCartRepository {
        async fn get(&self) -> DbResult<Cart> {
            self.inner.get().await
        }

        async fn set(&self, cart: &Cart) -> DbResult<()> {
            if self.fail_set {
                return Err(DbError::QueryFailed("disk full".into()));
            }
            self.inner.set(cart).await
        }

        async fn clear(&self) -> DbResult<()> {
            Err(DbError::QueryFailed("database is locked".into()))
        }
    }

    fn tier(id: &str, min: i64, max: i64, amount: i64) -> ShippingTier {
        ShippingTier {
            id: id.into(),
            name: format!("Tier {}", id),
            amount: Money::from_major(amount),
            min_amount: Money::from_major(min),
            max_amount: Money::from_major(max),
        }
    }

    fn percent(code: &str, value: i64) -> Coupon {
        Coupon::percentage(CouponCode::parse(code).unwrap(), Decimal::from(value))
    }

    fn session_with(api: Arc<FakeApi>, cart: Cart) -> CheckoutSession {
        CheckoutSession::new(api, Arc::new(InMemoryCartRepository::with_cart(cart)))
    }

    fn cart_worth(major: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("p-1", "Widget", Money::from_major(major), 1).unwrap())
            .unwrap();
        cart
    }

    fn release(tx: oneshot::Sender<()>) {
        let _ = tx.send(());
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_totals_end_to_end() {
        let api = Arc::new(FakeApi::with_coupons(vec![percent("SAVE10", 10)]));
        let gate = api.push_tiers(Some(vec![tier("1", 0, 1000, 15)]));
        release(gate);
        let session = session_with(api, cart_worth(100));

        session.refresh_tiers().await.unwrap();
        let totals = session.apply_coupon("save10").await.unwrap().fresh().unwrap();

        assert_eq!(totals.discount, Money::from_major(10));
        assert_eq!(totals.shipping_charge, Money::from_major(15));
        assert_eq!(totals.total, Money::from_major(105));
        assert_eq!(totals.shipping_tier_id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_no_tiers_no_coupon() {
        let session = session_with(Arc::new(FakeApi::default()), cart_worth(50));
        let totals = session.totals().await.unwrap();

        assert!(totals.discount.is_zero());
        assert!(totals.shipping_charge.is_zero());
        assert_eq!(totals.total, Money::from_major(50));
    }

    #[tokio::test]
    async fn test_invalid_coupon_keeps_prior() {
        let api = Arc::new(FakeApi::with_coupons(vec![percent("SAVE10", 10)]));
        let session = session_with(api, cart_worth(100));

        session.apply_coupon("SAVE10").await.unwrap();
        let before = session.totals().await.unwrap();

        let err = session.apply_coupon("BOGUS").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCoupon { .. }));

        let err = session.apply_coupon("   ").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCoupon { .. }));

        assert_eq!(session.coupon().await.unwrap().code.as_str(), "SAVE10");
        assert_eq!(session.totals().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_stale_coupon_response_dropped() {
        let api = Arc::new(FakeApi::with_coupons(vec![
            percent("SLOW", 50),
            percent("FAST", 10),
        ]));
        let slow_gate = api.gate_coupon("SLOW");
        let session = session_with(api, cart_worth(100));

        let (slow, fast) = tokio::join!(session.apply_coupon("SLOW"), async {
            let fast = session.apply_coupon("FAST").await;
            release(slow_gate);
            fast
        });

        assert!(slow.unwrap().is_stale());
        let fast = fast.unwrap().fresh().unwrap();
        assert_eq!(fast.discount, Money::from_major(10));
        assert_eq!(session.coupon().await.unwrap().code.as_str(), "FAST");
    }

    #[tokio::test]
    async fn test_stale_tier_response_dropped() {
        let api = Arc::new(FakeApi::default());
        let old_gate = api.push_tiers(Some(vec![tier("old", 0, 1000, 99)]));
        let new_gate = api.push_tiers(Some(vec![tier("new", 0, 1000, 5)]));
        release(new_gate);
        let session = session_with(api, cart_worth(20));

        let (old, new) = tokio::join!(session.refresh_tiers(), async {
            let new = session.refresh_tiers().await;
            release(old_gate);
            new
        });

        assert!(old.unwrap().is_stale());
        assert_eq!(new.unwrap().fresh().unwrap().shipping_charge, Money::from_major(5));
        assert_eq!(session.tiers().await[0].id, "new");
    }

    #[tokio::test]
    async fn test_failed_tier_refresh_keeps_tiers() {
        let api = Arc::new(FakeApi::default());
        release(api.push_tiers(Some(vec![tier("1", 0, 1000, 7)])));
        release(api.push_tiers(None));
        let session = session_with(api, cart_worth(20));

        session.refresh_tiers().await.unwrap();
        assert!(session.refresh_tiers().await.is_err());
        assert_eq!(session.tiers().await.len(), 1);
        assert_eq!(
            session.totals().await.unwrap().shipping_charge,
            Money::from_major(7)
        );
    }

    #[tokio::test]
    async fn test_remove_coupon_fences_inflight() {
        let api = Arc::new(FakeApi::with_coupons(vec![percent("SLOW", 50)]));
        let gate = api.gate_coupon("SLOW");
        let session = session_with(api, cart_worth(100));

        let (applied, removed) = tokio::join!(session.apply_coupon("SLOW"), async {
            let removed = session.remove_coupon().await;
            release(gate);
            removed
        });

        assert!(applied.unwrap().is_stale());
        assert!(removed.unwrap().discount.is_zero());
        assert!(session.coupon().await.is_none());
    }

    #[tokio::test]
    async fn test_cart_operations_persist() {
        let repo = Arc::new(InMemoryCartRepository::new());
        let session = CheckoutSession::new(Arc::new(FakeApi::default()), repo.clone());

        session
            .add_to_cart(CartItem::new("p-1", "Mug", Money::from_cents(1250), 2).unwrap())
            .await
            .unwrap();
        session
            .add_to_cart(CartItem::new("p-2", "Poster", Money::from_cents(500), 1).unwrap())
            .await
            .unwrap();
        session.update_quantity("p-1", 3).await.unwrap();
        session.remove_from_cart("p-2").await.unwrap();

        let stored = repo.get().await.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.subtotal(), Money::from_cents(3750));
        assert_eq!(session.totals().await.unwrap().total, Money::from_cents(3750));

        assert!(session.remove_from_cart("missing").await.is_err());

        session.clear_cart().await.unwrap();
        assert!(session.cart().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_order_clears_cart() {
        let api = Arc::new(FakeApi::with_coupons(vec![percent("SAVE10", 10)]));
        release(api.push_tiers(Some(vec![tier("7", 0, 1000, 15)])));
        let session = session_with(api.clone(), cart_worth(100));

        session.refresh_tiers().await.unwrap();
        session.apply_coupon("SAVE10").await.unwrap();

        let placed = session.place_order().await.unwrap();
        assert_eq!(placed.id, "ord-1");

        let orders = api.orders.lock().unwrap().clone();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].coupon_code.as_deref(), Some("SAVE10"));
        assert_eq!(orders[0].shipping_charge_id.as_deref(), Some("7"));
        assert_eq!(orders[0].total, Money::from_major(105));
        assert_eq!(orders[0].items[0].product_id, "p-1");

        assert!(session.cart().await.unwrap().is_empty());
        assert!(session.coupon().await.is_none());
    }

    #[tokio::test]
    async fn test_accepted_order_survives_cart_clear_failure() {
        let api = Arc::new(FakeApi::with_coupons(vec![percent("SAVE10", 10)]));
        let carts = Arc::new(StuckCartRepository {
            inner: InMemoryCartRepository::with_cart(cart_worth(30)),
            fail_set: false,
        });
        let session = CheckoutSession::new(api.clone(), carts);
        session.apply_coupon("SAVE10").await.unwrap();

        let placed = session.place_order().await.unwrap();
        assert_eq!(placed.id, "ord-1");
        assert!(session.coupon().await.is_none());

        // The fallback write emptied the cart, so a second attempt cannot resubmit
        assert!(matches!(
            session.place_order().await,
            Err(ClientError::EmptyCart)
        ));
        assert_eq!(api.orders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_accepted_order_returned_when_cart_store_is_stuck() {
        let api = Arc::new(FakeApi::with_coupons(vec![percent("SAVE10", 10)]));
        let carts = Arc::new(StuckCartRepository {
            inner: InMemoryCartRepository::with_cart(cart_worth(30)),
            fail_set: true,
        });
        let session = CheckoutSession::new(api.clone(), carts);
        session.apply_coupon("SAVE10").await.unwrap();

        let placed = session.place_order().await.unwrap();
        assert_eq!(placed.id, "ord-1");
        assert!(session.coupon().await.is_none());
        assert_eq!(api.orders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_place_order_empty_cart() {
        let session = session_with(Arc::new(FakeApi::default()), Cart::new());
        assert!(matches!(
            session.place_order().await,
            Err(ClientError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_failed_order_keeps_cart() {
        let api = Arc::new(FakeApi {
            reject_orders: true,
            ..Default::default()
        });
        let session = session_with(api, cart_worth(30));

        assert!(session.place_order().await.is_err());
        assert_eq!(session.cart().await.unwrap().subtotal(), Money::from_major(30));
    }

    #[tokio::test]
    async fn test_totals_are_memoized() {
        let session = session_with(Arc::new(FakeApi::default()), cart_worth(40));

        let a = session.totals().await.unwrap();
        let b = session.totals().await.unwrap();
        assert_eq!(a, b);
        assert_eq!(session.state.lock().await.calculator.computations(), 1);
    }
}
