//! # In-Memory Cart Repository
//!
//! Process-local cart storage. Nothing survives a restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CartRepository;
use crate::error::DbResult;
use storefront_core::Cart;

/// Cart repository holding the cart in memory.
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    cart: RwLock<Option<Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already holds `cart`.
    pub fn with_cart(cart: Cart) -> Self {
        InMemoryCartRepository {
            cart: RwLock::new(Some(cart)),
        }
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get(&self) -> DbResult<Cart> {
        Ok(self.cart.read().await.clone().unwrap_or_default())
    }

    async fn set(&self, cart: &Cart) -> DbResult<()> {
        *self.cart.write().await = Some(cart.clone());
        Ok(())
    }

    async fn clear(&self) -> DbResult<()> {
        *self.cart.write().await = None;
        Ok(())
    }
}
