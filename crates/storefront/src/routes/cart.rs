//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The anonymous cart token lives in the session; the commerce backend owns
//! the cart itself, and every mutation response is re-rendered from the
//! cart the API returns.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::{cart_token, ensure_cart_token};
use crate::routes::shop::ImageView;
use crate::state::AppState;
use crate::woo::CartToken;
use crate::woo::types::{Cart, CartItem};

// =============================================================================
// Views
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub key: String,
    pub url: String,
    pub name: String,
    /// Joined variation selection, e.g. `Size: M`.
    pub variation_label: Option<String>,
    pub quantity: i64,
    pub quantity_max: i64,
    pub unit_price: String,
    pub line_total: String,
    pub image: Option<ImageView>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: i64,
    pub subtotal: String,
    /// Coupon discount, when one applies.
    pub discount: Option<String>,
    pub total: String,
    pub coupons: Vec<String>,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        let zero = shoko_core::Money::zero(shoko_core::Currency::default());
        Self {
            items: Vec::new(),
            item_count: 0,
            subtotal: zero.format(),
            discount: None,
            total: zero.format(),
            coupons: Vec::new(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let discount = cart.totals.discount();
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            item_count: cart.items_count,
            subtotal: cart.totals.subtotal().format(),
            discount: (!discount.is_zero()).then(|| discount.format()),
            total: cart.totals.total().format(),
            coupons: cart.coupons.iter().map(|c| c.code.clone()).collect(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let variation_label = (!item.variation.is_empty()).then(|| {
            item.variation
                .iter()
                .map(|v| format!("{}: {}", v.name, v.value))
                .collect::<Vec<_>>()
                .join(", ")
        });

        Self {
            key: item.key.clone(),
            url: if item.permalink.is_empty() {
                "/shop".to_owned()
            } else {
                item.permalink.clone()
            },
            name: item.name.clone(),
            variation_label,
            quantity: item.quantity,
            quantity_max: item.quantity_limits.maximum,
            unit_price: item.prices.price().format(),
            line_total: item.totals.line_total().format(),
            image: item.images.first().map(|img| ImageView {
                url: if img.thumbnail.is_empty() {
                    img.src.clone()
                } else {
                    img.thumbnail.clone()
                },
                alt: img.alt.clone(),
            }),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
    /// Selected variation, required for variable products.
    pub variation_id: Option<i64>,
    pub quantity: Option<u32>,
    /// Set by the product form for variable products.
    pub requires_variation: Option<bool>,
}

/// Update cart line form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    pub quantity: u32,
}

/// Remove cart line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch the current cart view, degrading to empty on failure.
async fn current_cart_view(state: &AppState, token: &CartToken) -> CartView {
    match state.store().cart(token).await {
        Ok(cart) => CartView::from(&cart),
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            CartView::empty()
        }
    }
}

/// Render the items fragment from a mutation result, re-fetching the cart
/// and attaching the API's message when the mutation was rejected.
async fn items_fragment(
    state: &AppState,
    token: &CartToken,
    result: Result<Cart, crate::woo::StoreApiError>,
    fallback_message: &str,
) -> Response {
    match result {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(&cart),
                error: None,
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Cart mutation failed: {e}");
            let message = e
                .user_message()
                .map_or_else(|| fallback_message.to_owned(), ToOwned::to_owned);
            CartItemsTemplate {
                cart: current_cart_view(state, token).await,
                error: Some(message),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    // No token yet means the visitor never touched the cart; skip the API.
    let cart = match cart_token(&session).await {
        Some(token) => current_cart_view(&state, &token).await,
        None => CartView::empty(),
    };

    CartShowTemplate { cart, error: None }
}

/// Add item to cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger so the rest of the
/// page can refresh itself.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    // A variable product needs a selected variation.
    if form.requires_variation.unwrap_or(false) && form.variation_id.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Html("<span class=\"form-error\">Please select a size</span>"),
        )
            .into_response();
    }

    let token = match ensure_cart_token(&session).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to store cart token in session: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"form-error\">Error adding to cart</span>"),
            )
                .into_response();
        }
    };

    let id = form.variation_id.unwrap_or(form.product_id);
    let quantity = form.quantity.unwrap_or(1);

    match state.store().add_item(&token, id, quantity).await {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.items_count,
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            let message = e
                .user_message()
                .map_or_else(|| "Error adding to cart".to_owned(), ToOwned::to_owned);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("<span class=\"form-error\">{message}</span>")),
            )
                .into_response()
        }
    }
}

/// Update cart line quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(),
            error: None,
        }
        .into_response();
    };

    let result = state
        .store()
        .update_item(&token, &form.key, form.quantity)
        .await;
    items_fragment(&state, &token, result, "Could not update the cart").await
}

/// Remove cart line (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(),
            error: None,
        }
        .into_response();
    };

    let result = state.store().remove_item(&token, &form.key).await;
    items_fragment(&state, &token, result, "Could not update the cart").await
}

/// Remove everything from the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Response {
    let Some(token) = cart_token(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(),
            error: None,
        }
        .into_response();
    };

    let result = state.store().clear(&token).await;
    items_fragment(&state, &token, result, "Could not update the cart").await
}

/// Apply a coupon code (HTMX).
///
/// A rejected code re-renders the cart with the API's message inline.
#[instrument(skip(state, session))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CouponForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(),
            error: None,
        }
        .into_response();
    };

    let result = state.store().apply_coupon(&token, &form.code).await;
    items_fragment(&state, &token, result, "Could not apply that coupon").await
}

/// Remove an applied coupon code (HTMX).
#[instrument(skip(state, session))]
pub async fn remove_coupon(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CouponForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(),
            error: None,
        }
        .into_response();
    };

    let result = state.store().remove_coupon(&token, &form.code).await;
    items_fragment(&state, &token, result, "Could not remove that coupon").await
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let count = match cart_token(&session).await {
        Some(token) => state
            .store()
            .cart(&token)
            .await
            .map(|cart| cart.items_count)
            .unwrap_or(0),
        None => 0,
    };

    CartCountTemplate { count }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::woo::types::{
        CartCoupon, CartTotals, LineTotals, Prices, QuantityLimits, VariationAttribute,
    };
    use shoko_core::ProductId;

    fn cart_fixture() -> Cart {
        Cart {
            items: vec![CartItem {
                key: "abc123".to_owned(),
                id: ProductId::new(712),
                name: "Oversized Tee".to_owned(),
                permalink: "https://shoko.to/product/oversized-tee".to_owned(),
                quantity: 2,
                quantity_limits: QuantityLimits {
                    minimum: 1,
                    maximum: 5,
                    multiple_of: 1,
                },
                images: Vec::new(),
                variation: vec![VariationAttribute {
                    name: "Size".to_owned(),
                    value: "M".to_owned(),
                }],
                prices: Prices {
                    price: "4500".to_owned(),
                    regular_price: "4500".to_owned(),
                    ..Prices::default()
                },
                totals: LineTotals {
                    line_subtotal: "9000".to_owned(),
                    line_total: "9000".to_owned(),
                    ..LineTotals::default()
                },
            }],
            items_count: 2,
            coupons: vec![CartCoupon {
                code: "summer10".to_owned(),
            }],
            shipping_rates: Vec::new(),
            needs_shipping: true,
            totals: CartTotals {
                total_items: "9000".to_owned(),
                total_discount: "900".to_owned(),
                total_price: "8100".to_owned(),
                ..CartTotals::default()
            },
        }
    }

    #[test]
    fn test_cart_view_from_cart() {
        let view = CartView::from(&cart_fixture());
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "₵90.00");
        assert_eq!(view.discount.as_deref(), Some("₵9.00"));
        assert_eq!(view.total, "₵81.00");
        assert_eq!(view.coupons, vec!["summer10"]);
    }

    #[test]
    fn test_cart_item_view() {
        let view = CartView::from(&cart_fixture());
        let item = &view.items[0];
        assert_eq!(item.key, "abc123");
        assert_eq!(item.variation_label.as_deref(), Some("Size: M"));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.quantity_max, 5);
        assert_eq!(item.unit_price, "₵45.00");
        assert_eq!(item.line_total, "₵90.00");
        assert_eq!(item.url, "https://shoko.to/product/oversized-tee");
    }

    #[test]
    fn test_cart_item_view_simple_product_has_no_variation_label() {
        let mut cart = cart_fixture();
        cart.items[0].variation.clear();
        let view = CartView::from(&cart);
        assert!(view.items[0].variation_label.is_none());
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert_eq!(view.item_count, 0);
        assert_eq!(view.subtotal, "₵0.00");
        assert!(view.discount.is_none());
        assert!(view.items.is_empty());
    }

    #[test]
    fn test_cart_view_zero_discount_hidden() {
        let mut cart = cart_fixture();
        cart.totals.total_discount = "0".to_owned();
        cart.coupons.clear();
        let view = CartView::from(&cart);
        assert!(view.discount.is_none());
    }
}
