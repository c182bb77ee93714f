//! Command implementations.

use anyhow::{bail, Context as _, Result};
use tracing::warn;

use crate::output;
use crate::Context;
use storefront_client::{ClientError, SessionStatus, SessionToken, StorefrontApi};
use storefront_core::validation::validate_amount;
use storefront_core::{compute_totals, CartItem, Coupon, CouponCode, Money};

/// `checkout quote <subtotal> [--coupon CODE]`
pub async fn quote(ctx: &Context, subtotal: &str, coupon: Option<&str>) -> Result<()> {
    let subtotal: Money = subtotal
        .parse()
        .with_context(|| format!("{:?} is not an amount", subtotal))?;
    validate_amount("subtotal", subtotal)?;

    let tiers = ctx.api.shipping_tiers().await?;
    let coupon = match coupon {
        Some(raw) => Some(lookup_coupon(ctx, raw).await?),
        None => None,
    };

    let totals = compute_totals(subtotal, &tiers, coupon.as_ref());
    output::totals(ctx.json, &totals, coupon.as_ref())
}

/// `checkout add <id> <name> <price> [-q N]`
pub async fn add(
    ctx: &Context,
    product_id: String,
    name: String,
    price: &str,
    quantity: u32,
) -> Result<()> {
    let unit_price: Money = price
        .parse()
        .with_context(|| format!("{:?} is not a price", price))?;
    let item = CartItem::new(product_id, name, unit_price, quantity)?;

    let cart = ctx.session.add_to_cart(item).await?;
    output::cart_summary(ctx.json, &cart)
}

/// `checkout remove <id>`
pub async fn remove(ctx: &Context, product_id: &str) -> Result<()> {
    let cart = ctx.session.remove_from_cart(product_id).await?;
    output::cart_summary(ctx.json, &cart)
}

/// `checkout cart [--coupon CODE]`
pub async fn cart(ctx: &Context, coupon: Option<&str>) -> Result<()> {
    prepare_session(ctx, coupon).await?;

    let cart = ctx.session.cart().await?;
    let totals = ctx.session.totals().await?;
    let coupon = ctx.session.coupon().await;

    output::cart_summary(ctx.json, &cart)?;
    output::totals(ctx.json, &totals, coupon.as_ref())
}

/// `checkout place [--coupon CODE]`
pub async fn place(ctx: &Context, coupon: Option<&str>) -> Result<()> {
    if let Some(raw) = &ctx.config.api.token {
        let token = SessionToken::parse(raw)?;
        match token.status(ctx.config.expiry_margin()) {
            SessionStatus::Expired => return Err(ClientError::SessionExpired.into()),
            SessionStatus::ExpiringSoon => warn!(
                remaining_secs = token.remaining_secs(),
                "Session expires soon"
            ),
            SessionStatus::Active => {}
        }
    }

    prepare_session(ctx, coupon).await?;
    let placed = ctx.session.place_order().await?;
    output::placed(ctx.json, &placed)
}

/// `checkout session`
pub fn session(ctx: &Context) -> Result<()> {
    let Some(raw) = &ctx.config.api.token else {
        bail!("No session token configured (set STOREFRONT_TOKEN)");
    };
    let token = SessionToken::parse(raw)?;
    output::session(ctx.json, &token, token.status(ctx.config.expiry_margin()))
}

/// Loads live tiers and, if given, applies a coupon.
async fn prepare_session(ctx: &Context, coupon: Option<&str>) -> Result<()> {
    ctx.session.refresh_tiers().await?;
    if let Some(raw) = coupon {
        ctx.session.apply_coupon(raw).await?;
    }
    Ok(())
}

async fn lookup_coupon(ctx: &Context, raw: &str) -> Result<Coupon> {
    let code = CouponCode::parse(raw).map_err(|_| ClientError::InvalidCoupon {
        code: raw.trim().to_string(),
    })?;
    Ok(ctx.api.validate_coupon(&code).await?)
}
