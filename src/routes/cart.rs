use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    audit,
    cart::checkout,
    dto::cart::{AddToCartRequest, CartView, CheckoutResponse},
    error::{AppError, AppResult},
    middleware::{auth::AuthUser, session::SessionKey},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart).post(add_to_cart).delete(clear_cart))
        .route("/checkout", post(checkout_cart))
        .route("/{product_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("x-session-id" = String, Header, description = "Browsing session key")
    ),
    responses(
        (status = 200, description = "Cart lines and derived totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    session: SessionKey,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state.carts.view(session.as_str()).await;
    Ok(Json(ApiResponse::success(
        "OK",
        CartView::from(cart),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    params(
        ("x-session-id" = String, Header, description = "Browsing session key")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add one unit of a product", body = ApiResponse<CartView>),
        (status = 400, description = "Bad request"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionKey,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    if payload.price < 0 {
        return Err(AppError::BadRequest(
            "price must not be negative".to_string(),
        ));
    }
    let cart = state.carts.add(session.as_str(), payload.into()).await;
    Ok(Json(ApiResponse::success(
        "Added to cart",
        CartView::from(cart),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{product_id}",
    params(
        ("x-session-id" = String, Header, description = "Browsing session key"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Remove a line; removing an absent id is a no-op", body = ApiResponse<CartView>),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: SessionKey,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state.carts.remove(session.as_str(), product_id).await;
    Ok(Json(ApiResponse::success(
        "Removed from cart",
        CartView::from(cart),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    params(
        ("x-session-id" = String, Header, description = "Browsing session key")
    ),
    responses(
        (status = 200, description = "Empty the cart", body = ApiResponse<CartView>),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    session: SessionKey,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state.carts.clear(session.as_str()).await;
    Ok(Json(ApiResponse::success(
        "Cart cleared",
        CartView::from(cart),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/cart/checkout",
    params(
        ("x-session-id" = String, Header, description = "Browsing session key")
    ),
    responses(
        (status = 200, description = "Submit the cart as an order and clear it", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart or checkout already in progress"),
        (status = 401, description = "Not authenticated"),
        (status = 502, description = "A checkout collaborator failed; the cart is unchanged"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout_cart(
    State(state): State<AppState>,
    session: SessionKey,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let outcome = checkout::submit(
        &state.carts,
        state.catalog.as_ref(),
        state.orders.as_ref(),
        user.user_id,
        session.as_str(),
    )
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": outcome.order_id })),
    )
    .await;

    Ok(Json(ApiResponse::success(
        "Checkout success",
        CheckoutResponse::from(outcome),
        Some(Meta::empty()),
    )))
}
