//! Terminal output. Amounts are always the rounded presentation values.

use anyhow::Result;
use serde::Serialize;

use storefront_client::{PlacedOrder, SessionStatus, SessionToken};
use storefront_core::{Cart, Coupon, OrderTotals};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn totals(json: bool, totals: &OrderTotals, coupon: Option<&Coupon>) -> Result<()> {
    let shown = totals.rounded();
    if json {
        return print_json(&shown);
    }

    println!("{:<12}{:>12}", "Subtotal", shown.subtotal);
    if let Some(coupon) = coupon {
        println!(
            "{:<12}{:>12}  ({})",
            "Discount",
            format!("-{}", shown.discount),
            coupon.code
        );
    }
    match &shown.shipping_tier_id {
        Some(id) => println!(
            "{:<12}{:>12}  (tier {})",
            "Shipping", shown.shipping_charge, id
        ),
        None => println!("{:<12}{:>12}", "Shipping", shown.shipping_charge),
    }
    println!("{:<12}{:>12}", "Total", shown.total);
    Ok(())
}

pub fn cart_summary(json: bool, cart: &Cart) -> Result<()> {
    if json {
        return print_json(cart);
    }

    if cart.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }

    for item in &cart.items {
        println!(
            "{:>4} x {:<28}{:>10}  {}",
            item.quantity,
            item.name,
            item.line_total().rounded(),
            item.product_id
        );
    }
    println!();
    Ok(())
}

pub fn placed(json: bool, order: &PlacedOrder) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "id": order.id,
            "status": order.status,
        }));
    }
    println!("Order {} placed ({})", order.id, order.status);
    Ok(())
}

pub fn session(json: bool, token: &SessionToken, status: SessionStatus) -> Result<()> {
    let claims = token.claims();
    if json {
        return print_json(&serde_json::json!({
            "user_id": claims.sub,
            "email": claims.email,
            "role": claims.role,
            "expires_at": token.expires_at().to_rfc3339(),
            "remaining_secs": token.remaining_secs(),
            "status": status.to_string(),
        }));
    }

    println!("User      {}", claims.sub);
    if let Some(email) = &claims.email {
        println!("Email     {}", email);
    }
    println!("Expires   {}", token.expires_at().to_rfc3339());
    println!("Status    {} ({}s left)", status, token.remaining_secs());
    Ok(())
}
