//! Checkout: turn a cart into a submitted order. The cart's lines are read
//! once on entry; mutations made while the order submission is in flight
//! neither block nor retroactively change what gets submitted.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{OrderStatus, Product};

use super::CartLine;
use super::registry::CartRegistry;

/// Catalog listing, consulted only at checkout to resolve full product
/// records for the cart's cached lines.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<Product>>;
}

/// Order submission. A failed create must leave no trace; the caller keeps
/// the cart untouched and reports a retryable failure.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create(&self, order: NewOrder) -> anyhow::Result<Uuid>;
}

/// The aggregate handed to [`OrderGateway::create`] in a single call.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<ResolvedItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct ResolvedItem {
    pub product: Product,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order_id: Uuid,
    pub total_amount: i64,
    pub total_items: i64,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("checkout already in progress")]
    AlreadyInFlight,
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

/// Run the checkout workflow for one session.
///
/// Success clears the cart (with the cleared state persisted best-effort);
/// any failure leaves the cart exactly as it was so the user can retry.
pub async fn submit(
    carts: &CartRegistry,
    catalog: &dyn Catalog,
    orders: &dyn OrderGateway,
    user_id: Uuid,
    session_key: &str,
) -> Result<CheckoutOutcome, CheckoutError> {
    let _guard = carts
        .begin_checkout(session_key)
        .ok_or(CheckoutError::AlreadyInFlight)?;

    // The one and only read of the cart for this attempt.
    let cart = carts.view(session_key).await;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let listing = catalog.list_all().await?;
    let items = resolve_lines(cart.lines(), listing);

    let total_amount = cart.total_price();
    let order_id = orders
        .create(NewOrder {
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
        })
        .await?;

    carts.clear(session_key).await;

    Ok(CheckoutOutcome {
        order_id,
        total_amount,
        total_items: cart.total_items(),
    })
}

/// Pair every cart line with its full catalog record. A line whose id no
/// longer matches a catalog entry is resolved to a placeholder built from
/// the line's own snapshot, so a stale cache entry cannot fail checkout.
fn resolve_lines(lines: &[CartLine], listing: Vec<Product>) -> Vec<ResolvedItem> {
    let mut by_id: HashMap<Uuid, Product> = listing.into_iter().map(|p| (p.id, p)).collect();
    lines
        .iter()
        .map(|line| ResolvedItem {
            product: by_id
                .remove(&line.id)
                .unwrap_or_else(|| placeholder_for(line)),
            quantity: line.quantity,
        })
        .collect()
}

fn placeholder_for(line: &CartLine) -> Product {
    let now = Utc::now();
    Product {
        id: line.id,
        title: line.title.clone(),
        description: None,
        price: line.price,
        category: "unknown".to_string(),
        image: line.image.clone(),
        rating_rate: 0.0,
        rating_count: 0,
        created_at: now,
        updated_at: now,
    }
}
