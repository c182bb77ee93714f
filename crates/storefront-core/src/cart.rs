//! # Cart
//!
//! The customer's cart: line items and their subtotal.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Storefront Action         Method                  Cart Change          │
//! │  ─────────────────         ──────                  ───────────          │
//! │                                                                         │
//! │  Add to cart ─────────────► add_item() ──────────► push or merge qty   │
//! │                                                                         │
//! │  Change quantity ─────────► update_quantity() ───► items[i].qty = n    │
//! │                                                                         │
//! │  Remove ──────────────────► remove_item() ───────► items.remove(i)     │
//! │                                                                         │
//! │  Order placed ────────────► clear() ─────────────► items.clear()       │
//! │                                                                         │
//! │  Persistence lives behind CartRepository (storefront-db).              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{validate_amount, validate_cart_size, validate_id, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// An item in the cart.
///
/// ## Design Notes
/// The name and unit price are a snapshot taken when the item was added,
/// so the cart renders consistently even if the catalogue changes. The
/// backend re-prices on order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product identifier from the catalogue API.
    pub product_id: String,

    /// Product name at time of adding.
    pub name: String,

    /// Unit price at time of adding.
    #[ts(as = "String")]
    pub unit_price: Money,

    /// Quantity in cart (1..=999).
    pub quantity: u32,
}

impl CartItem {
    /// Creates a validated cart item.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> CoreResult<Self> {
        let product_id = product_id.into();
        validate_id("product id", &product_id)?;
        validate_amount("unit price", unit_price)?;
        validate_quantity(quantity)?;

        Ok(CartItem {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
        })
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product merges)
/// - Quantity is in `1..=MAX_ITEM_QUANTITY`; setting it to 0 removes the item
/// - At most `MAX_CART_ITEMS` distinct items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item or increases the quantity if the product is present.
    ///
    /// The stored snapshot (name, price) is refreshed from the incoming
    /// item on merge.
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<()> {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            let new_qty = existing.quantity.saturating_add(item.quantity);
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            existing.name = item.name;
            existing.unit_price = item.unit_price;
            return Ok(());
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;

        self.items.push(item);
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotInCart(product_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Removes a line by product id.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals, before discount and shipping.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price_cents: i64, qty: u32) -> CartItem {
        CartItem::new(id, format!("Product {}", id), Money::from_cents(price_cents), qty).unwrap()
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_item(item("1", 999, 2)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        cart.add_item(item("1", 999, 2)).unwrap();
        cart.add_item(item("1", 999, 3)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_quantity_limit() {
        let mut cart = Cart::new();
        cart.add_item(item("1", 100, 990)).unwrap();
        let err = cart.add_item(item("1", 100, 10)).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.total_quantity(), 990);
    }

    #[test]
    fn test_cart_size_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(item(&i.to_string(), 100, 1)).unwrap();
        }
        let err = cart.add_item(item("overflow", 100, 1)).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add_item(item("1", 500, 1)).unwrap();
        cart.add_item(item("2", 250, 4)).unwrap();

        cart.update_quantity("1", 3).unwrap();
        assert_eq!(cart.subtotal().cents(), 1500 + 1000);

        cart.update_quantity("2", 0).unwrap();
        assert_eq!(cart.item_count(), 1);

        assert!(matches!(
            cart.update_quantity("missing", 1),
            Err(CoreError::ItemNotInCart(_))
        ));
        assert!(cart.remove_item("2").is_err());
    }

    #[test]
    fn test_cart_item_validation() {
        assert!(CartItem::new("", "x", Money::from_cents(100), 1).is_err());
        assert!(CartItem::new("1", "x", Money::from_cents(-1), 1).is_err());
        assert!(CartItem::new("1", "x", Money::from_cents(100), 0).is_err());
        assert!(CartItem::new("1", "x", Money::from_major(crate::MAX_AMOUNT + 1), 1).is_err());
    }

    #[test]
    fn test_subtotal_of_huge_lines_saturates() {
        let huge = CartItem {
            product_id: "big".to_string(),
            name: "Big".to_string(),
            unit_price: Money::MAX,
            quantity: 2,
        };
        let mut cart = Cart::new();
        cart.add_item(huge.clone()).unwrap();
        cart.add_item(CartItem { product_id: "big-2".to_string(), ..huge }).unwrap();

        assert_eq!(cart.subtotal(), Money::MAX);
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        cart.add_item(item("1", 999, 2)).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_cart_json_round_trip_shape() {
        let mut cart = Cart::new();
        cart.add_item(item("7", 1250, 2)).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"][0]["unit_price"], "12.50");
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
