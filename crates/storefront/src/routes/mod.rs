//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Shop
//! GET  /shop                   - Product listing with filters
//! GET  /shop/products          - Product grid fragment (HTMX infinite scroll)
//! GET  /shop/{category}        - Listing pre-filtered to a category
//! GET  /products/{slug}        - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add item (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Remove everything (returns cart_items fragment)
//! POST /cart/coupon            - Apply coupon (returns cart_items fragment)
//! POST /cart/coupon/remove     - Remove coupon (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Checkout page
//! POST /checkout/address       - Update addresses (returns summary fragment)
//! POST /checkout/shipping      - Select shipping rate (returns summary fragment)
//! POST /checkout               - Place the order
//! GET  /order/{id}             - Order confirmation
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::cart_rate_limiter;
use crate::state::AppState;

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/products", get(shop::products_fragment))
        .route("/{category}", get(shop::category))
}

/// Create the cart routes router.
///
/// Mutations are rate limited; every one of them hits the commerce backend.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/coupon", post(cart::apply_coupon))
        .route("/coupon/remove", post(cart::remove_coupon))
        .layer(cart_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/address", post(checkout::update_address))
        .route("/shipping", post(checkout::select_shipping))
        .layer(cart_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Shop listing
        .nest("/shop", shop_routes())
        // Product detail
        .route("/products/{slug}", get(products::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        // Order confirmation
        .route("/order/{id}", get(orders::show))
}
