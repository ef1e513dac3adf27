use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartLine,
    dto::{
        cart::{AddToCartRequest, CartView, CheckoutResponse},
        orders::{OrderList, OrderWithItems},
        products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
        users::{UpdateProfileRequest, UserProfile},
    },
    models::{Order, OrderItem, OrderStatus, Product},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, params, products as product_routes, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        cart::view_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::checkout_cart,
        product_routes::list_products,
        product_routes::list_categories,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        orders::list_orders,
        orders::get_order,
        users::get_profile,
        users::update_profile,
        admin::list_all_orders,
        admin::update_order_status
    ),
    components(
        schemas(
            UserProfile,
            UpdateProfileRequest,
            Product,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CategoryList,
            CartLine,
            AddToCartRequest,
            CartView,
            CheckoutResponse,
            Order,
            OrderItem,
            OrderStatus,
            OrderList,
            OrderWithItems,
            admin::UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<UserProfile>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Order history endpoints"),
        (name = "Users", description = "Profile endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
