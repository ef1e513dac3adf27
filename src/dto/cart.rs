use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::checkout::CheckoutOutcome;
use crate::cart::{Cart, CartLine, ProductSnapshot, display_amount};

/// The add intent: the product's display snapshot travels with the request,
/// so adding never consults the catalog.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub title: String,
    /// Minor currency units (cents).
    pub price: i64,
    pub image: String,
}

impl From<AddToCartRequest> for ProductSnapshot {
    fn from(payload: AddToCartRequest) -> Self {
        ProductSnapshot {
            id: payload.product_id,
            title: payload.title,
            price: payload.price,
            image: payload.image,
        }
    }
}

/// Read-only projection of a cart with its derived totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_items: i64,
    /// Minor currency units (cents).
    pub total_price: i64,
    /// Two-decimal major-unit rendering of `total_price`.
    pub total_price_display: String,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self {
            total_items: cart.total_items(),
            total_price: cart.total_price(),
            total_price_display: display_amount(cart.total_price()),
            items: cart.lines().to_vec(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub total_amount: i64,
    pub total_items: i64,
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            order_id: outcome.order_id,
            total_amount: outcome.total_amount,
            total_items: outcome.total_items,
        }
    }
}
