//! # Cart Repository (SQLite)
//!
//! One row per cart owner in the `carts` table. The cart itself is stored
//! as a JSON payload; `item_count` is kept alongside for diagnostics.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::CartRepository;
use crate::error::DbResult;
use storefront_core::Cart;

/// SQLite-backed cart storage for a single owner key.
///
/// ## Usage
/// ```rust,ignore
/// let carts = db.carts("guest");
/// let mut cart = carts.get().await?;
/// cart.add_item(item)?;
/// carts.set(&cart).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCartRepository {
    pool: SqlitePool,
    cart_key: String,
}

impl SqliteCartRepository {
    /// Creates a repository bound to `cart_key`.
    pub fn new(pool: SqlitePool, cart_key: impl Into<String>) -> Self {
        SqliteCartRepository {
            pool,
            cart_key: cart_key.into(),
        }
    }

    /// The owner key this repository reads and writes.
    pub fn cart_key(&self) -> &str {
        &self.cart_key
    }
}

#[async_trait]
impl CartRepository for SqliteCartRepository {
    async fn get(&self) -> DbResult<Cart> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM carts WHERE cart_key = ?1")
                .bind(&self.cart_key)
                .fetch_optional(&self.pool)
                .await?;

        let Some(payload) = payload else {
            debug!(cart_key = %self.cart_key, "No stored cart");
            return Ok(Cart::new());
        };

        // A payload written by an older build may no longer decode.
        match serde_json::from_str::<Cart>(&payload) {
            Ok(cart) => {
                debug!(
                    cart_key = %self.cart_key,
                    items = cart.item_count(),
                    "Loaded cart"
                );
                Ok(cart)
            }
            Err(e) => {
                warn!(
                    cart_key = %self.cart_key,
                    error = %e,
                    "Stored cart is unreadable, starting empty"
                );
                Ok(Cart::new())
            }
        }
    }

    async fn set(&self, cart: &Cart) -> DbResult<()> {
        let payload = serde_json::to_string(cart)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO carts (cart_key, payload, item_count, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(cart_key) DO UPDATE SET
                payload = excluded.payload,
                item_count = excluded.item_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.cart_key)
        .bind(&payload)
        .bind(cart.item_count() as i64)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(
            cart_key = %self.cart_key,
            items = cart.item_count(),
            "Saved cart"
        );
        Ok(())
    }

    async fn clear(&self) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM carts WHERE cart_key = ?1")
            .bind(&self.cart_key)
            .execute(&self.pool)
            .await?;

        debug!(
            cart_key = %self.cart_key,
            removed = result.rows_affected(),
            "Cleared cart"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use storefront_core::{CartItem, Money};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("p-1", "Mug", Money::from_cents(1250), 2).unwrap())
            .unwrap();
        cart.add_item(CartItem::new("p-2", "Poster", Money::from_cents(899), 1).unwrap())
            .unwrap();
        cart
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let db = test_db().await;
        let cart = db.carts("guest").get().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let db = test_db().await;
        let repo = db.carts("guest");
        let cart = sample_cart();

        repo.set(&cart).await.unwrap();
        assert_eq!(repo.get().await.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_set_records_updated_at() {
        let db = test_db().await;
        let repo = db.carts("guest");
        repo.set(&sample_cart()).await.unwrap();

        let updated_at: String =
            sqlx::query_scalar("SELECT updated_at FROM carts WHERE cart_key = ?1")
                .bind("guest")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&updated_at).is_ok());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = test_db().await;
        let repo = db.carts("guest");

        repo.set(&sample_cart()).await.unwrap();

        let mut smaller = Cart::new();
        smaller
            .add_item(CartItem::new("p-9", "Sticker", Money::from_cents(100), 3).unwrap())
            .unwrap();
        repo.set(&smaller).await.unwrap();

        let loaded = repo.get().await.unwrap();
        assert_eq!(loaded, smaller);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let db = test_db().await;
        db.carts("guest").set(&sample_cart()).await.unwrap();

        let other = db.carts("user-42").get().await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let db = test_db().await;
        let repo = db.carts("guest");
        repo.set(&sample_cart()).await.unwrap();

        repo.clear().await.unwrap();
        assert!(repo.get().await.unwrap().is_empty());

        // Clearing an absent cart is fine.
        repo.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_empty() {
        let db = test_db().await;
        sqlx::query(
            "INSERT INTO carts (cart_key, payload, item_count, updated_at) VALUES (?1, ?2, 0, ?3)",
        )
        .bind("guest")
        .bind("{not json")
        .bind(Utc::now().to_rfc3339())
        .execute(db.pool())
        .await
        .unwrap();

        let cart = db.carts("guest").get().await.unwrap();
        assert!(cart.is_empty());
    }
}
