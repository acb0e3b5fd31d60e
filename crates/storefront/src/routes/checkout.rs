//! Checkout route handlers.
//!
//! One-page checkout: address form, shipping options, payment method list,
//! and order summary. Address changes re-price shipping through the
//! commerce backend; placing the order hands off to the gateway redirect
//! URL when the payment method provides one.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shoko_core::Email;

use crate::filters;
use crate::middleware::cart_token;
use crate::routes::cart::CartView;
use crate::state::AppState;
use crate::woo::CartToken;
use crate::woo::types::{Address, Cart, OrderRequest};

// =============================================================================
// Payment methods
// =============================================================================

/// A selectable payment method.
#[derive(Debug, Clone, Copy)]
pub struct PaymentMethod {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Payment methods offered at checkout.
pub const PAYMENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod {
        id: "paystack",
        title: "Pay with Card (Paystack)",
        description: "Secure payment with Paystack",
    },
    PaymentMethod {
        id: "bacs",
        title: "Direct Bank Transfer",
        description: "Make payment directly into our bank account",
    },
    PaymentMethod {
        id: "cod",
        title: "Cash on Delivery",
        description: "Pay with cash upon delivery",
    },
];

// =============================================================================
// Views
// =============================================================================

/// A shipping rate radio option.
#[derive(Clone)]
pub struct ShippingOptionView {
    pub package_id: i64,
    pub rate_id: String,
    pub label: String,
    pub price: String,
    pub selected: bool,
}

/// Order summary panel: totals plus selectable shipping rates.
#[derive(Clone)]
pub struct SummaryView {
    pub subtotal: String,
    pub discount: Option<String>,
    pub shipping: Option<String>,
    pub total: String,
    pub options: Vec<ShippingOptionView>,
    pub needs_shipping: bool,
}

impl From<&Cart> for SummaryView {
    fn from(cart: &Cart) -> Self {
        let discount = cart.totals.discount();
        let options = cart
            .shipping_rates
            .iter()
            .flat_map(|package| {
                package.shipping_rates.iter().map(|rate| ShippingOptionView {
                    package_id: package.package_id,
                    rate_id: rate.rate_id.clone(),
                    label: rate.name.clone(),
                    price: rate.price().format(),
                    selected: rate.selected,
                })
            })
            .collect();

        Self {
            subtotal: cart.totals.subtotal().format(),
            discount: (!discount.is_zero()).then(|| discount.format()),
            shipping: cart.totals.shipping().map(|s| s.format()),
            total: cart.totals.total().format(),
            options,
            needs_shipping: cart.needs_shipping,
        }
    }
}

/// A payment method radio option.
#[derive(Clone)]
pub struct PaymentMethodView {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub selected: bool,
}

/// Build the payment method list with the given selection.
fn payment_method_views(selected: &str) -> Vec<PaymentMethodView> {
    PAYMENT_METHODS
        .iter()
        .map(|method| PaymentMethodView {
            id: method.id,
            title: method.title,
            description: method.description,
            selected: method.id == selected,
        })
        .collect()
}

/// Address form values, prefilled from the checkout state or re-rendered
/// after a validation error.
#[derive(Clone, Default)]
pub struct FormView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub customer_note: String,
}

impl FormView {
    fn from_billing(billing: &Address) -> Self {
        Self {
            first_name: billing.first_name.clone(),
            last_name: billing.last_name.clone(),
            email: billing.email.clone().unwrap_or_default(),
            phone: billing.phone.clone(),
            company: billing.company.clone(),
            address_1: billing.address_1.clone(),
            address_2: billing.address_2.clone(),
            city: billing.city.clone(),
            state: billing.state.clone(),
            postcode: billing.postcode.clone(),
            country: billing.country.clone(),
            customer_note: String::new(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Checkout form data.
///
/// Also accepted by the address-update fragment endpoint, where the payment
/// fields are absent.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    pub payment_method: Option<String>,
    pub customer_note: Option<String>,
}

/// Shipping rate selection form data.
#[derive(Debug, Deserialize)]
pub struct SelectShippingForm {
    pub package_id: i64,
    pub rate_id: String,
}

/// A validated order submission.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub billing: Address,
    pub shipping: Address,
    pub payment_method: String,
    pub customer_note: Option<String>,
}

impl CheckoutForm {
    /// Build the shipping address from the form (no validation; partial
    /// addresses are fine for re-pricing shipping).
    fn shipping_address(&self) -> Address {
        Address {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company: self.company.clone(),
            address_1: self.address_1.clone(),
            address_2: self.address_2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postcode: self.postcode.clone(),
            country: if self.country.is_empty() {
                "GH".to_owned()
            } else {
                self.country.clone()
            },
            phone: self.phone.clone(),
            email: None,
        }
    }

    /// The billing address is the shipping address plus the email.
    fn billing_address(&self) -> Address {
        Address {
            email: (!self.email.is_empty()).then(|| self.email.clone()),
            ..self.shipping_address()
        }
    }

    /// Validate the form into an order submission.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message naming the first problem found.
    pub fn validate(&self) -> Result<OrderSubmission, String> {
        let required = [
            (&self.first_name, "first name"),
            (&self.last_name, "last name"),
            (&self.address_1, "street address"),
            (&self.city, "city"),
            (&self.state, "region"),
        ];
        for (value, label) in required {
            if value.trim().is_empty() {
                return Err(format!("Please enter your {label}"));
            }
        }

        Email::parse(self.email.trim()).map_err(|e| format!("Invalid email address: {e}"))?;

        let payment_method = self
            .payment_method
            .as_deref()
            .unwrap_or_default()
            .to_owned();
        if !PAYMENT_METHODS.iter().any(|m| m.id == payment_method) {
            return Err("Please choose a payment method".to_owned());
        }

        let customer_note = self
            .customer_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(ToOwned::to_owned);

        Ok(OrderSubmission {
            billing: self.billing_address(),
            shipping: self.shipping_address(),
            payment_method,
            customer_note,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub cart: CartView,
    pub summary: SummaryView,
    pub form: FormView,
    pub payment_methods: Vec<PaymentMethodView>,
    pub error: Option<String>,
    /// Inline message shown in the summary fragment; always `None` on a
    /// full page render.
    pub summary_error: Option<String>,
}

/// Shipping options and totals fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_summary.html")]
pub struct CheckoutSummaryTemplate {
    pub summary: SummaryView,
    pub summary_error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page. An empty (or missing) cart redirects back to
/// the cart page instead of erroring.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Response {
    let Some(token) = cart_token(&session).await else {
        return Redirect::to("/cart").into_response();
    };

    let cart = match state.store().cart(&token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to fetch cart for checkout: {e}");
            return Redirect::to("/cart").into_response();
        }
    };
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    // Prefill from any previous checkout attempt; defaults otherwise.
    let (form, payment_method) = match state.store().checkout(&token).await {
        Ok(checkout) => {
            let method = if checkout.payment_method.is_empty() {
                default_payment_method()
            } else {
                checkout.payment_method
            };
            (FormView::from_billing(&checkout.billing_address), method)
        }
        Err(e) => {
            tracing::warn!("Failed to fetch checkout state: {e}");
            (FormView::default(), default_payment_method())
        }
    };

    CheckoutShowTemplate {
        cart: CartView::from(&cart),
        summary: SummaryView::from(&cart),
        form,
        payment_methods: payment_method_views(&payment_method),
        error: None,
        summary_error: None,
    }
    .into_response()
}

fn default_payment_method() -> String {
    PAYMENT_METHODS
        .first()
        .map(|m| m.id.to_owned())
        .unwrap_or_default()
}

/// Update the customer's addresses and re-render the summary fragment
/// (shipping is re-priced for the new address).
#[instrument(skip(state, session, form))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return Redirect::to("/cart").into_response();
    };

    let billing = form.billing_address();
    let shipping = form.shipping_address();

    let result = state
        .store()
        .update_customer(&token, &billing, Some(&shipping))
        .await;
    summary_fragment(&state, &token, result, "Could not update the address").await
}

/// Select a shipping rate and re-render the summary fragment.
#[instrument(skip(state, session))]
pub async fn select_shipping(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SelectShippingForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return Redirect::to("/cart").into_response();
    };

    let result = state
        .store()
        .select_shipping_rate(&token, form.package_id, &form.rate_id)
        .await;
    summary_fragment(&state, &token, result, "Could not select that shipping option").await
}

async fn summary_fragment(
    state: &AppState,
    token: &CartToken,
    result: Result<Cart, crate::woo::StoreApiError>,
    fallback_message: &str,
) -> Response {
    match result {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CheckoutSummaryTemplate {
                summary: SummaryView::from(&cart),
                summary_error: None,
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Checkout update failed: {e}");
            let message = e
                .user_message()
                .map_or_else(|| fallback_message.to_owned(), ToOwned::to_owned);
            let summary = match state.store().cart(token).await {
                Ok(cart) => SummaryView::from(&cart),
                Err(fetch_err) => {
                    tracing::warn!("Failed to re-fetch cart: {fetch_err}");
                    SummaryView::from(&Cart::default())
                }
            };
            CheckoutSummaryTemplate {
                summary,
                summary_error: Some(message),
            }
            .into_response()
        }
    }
}

/// Place the order.
///
/// On success the visitor goes to the gateway redirect URL when the payment
/// method provides one, otherwise straight to the confirmation page. A
/// rejected submission re-renders the page with the message and the entered
/// values.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return Redirect::to("/cart").into_response();
    };

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(message) => return rerender_with_error(&state, &token, &form, message).await,
    };

    let request = OrderRequest {
        billing_address: submission.billing,
        shipping_address: submission.shipping,
        payment_method: submission.payment_method,
        customer_note: submission.customer_note,
    };

    match state.store().place_order(&token, &request).await {
        Ok(checkout) => {
            let redirect_url = checkout
                .payment_result
                .as_ref()
                .map(|r| r.redirect_url.clone())
                .filter(|url| !url.is_empty());
            match redirect_url {
                Some(url) => Redirect::to(&url).into_response(),
                None => Redirect::to(&format!("/order/{}", checkout.order_id)).into_response(),
            }
        }
        Err(e) => {
            tracing::error!("Failed to place order: {e}");
            let message = e.user_message().map_or_else(
                || "Could not place the order, please try again".to_owned(),
                ToOwned::to_owned,
            );
            rerender_with_error(&state, &token, &form, message).await
        }
    }
}

/// Re-render the checkout page with an error and the submitted values.
async fn rerender_with_error(
    state: &AppState,
    token: &CartToken,
    form: &CheckoutForm,
    message: String,
) -> Response {
    let cart = match state.store().cart(token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to fetch cart: {e}");
            return Redirect::to("/cart").into_response();
        }
    };
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let selected = form
        .payment_method
        .clone()
        .unwrap_or_else(default_payment_method);

    CheckoutShowTemplate {
        cart: CartView::from(&cart),
        summary: SummaryView::from(&cart),
        form: FormView {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            company: form.company.clone(),
            address_1: form.address_1.clone(),
            address_2: form.address_2.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            postcode: form.postcode.clone(),
            country: form.country.clone(),
            customer_note: form.customer_note.clone().unwrap_or_default(),
        },
        payment_methods: payment_method_views(&selected),
        error: Some(message),
        summary_error: None,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::woo::types::{CartTotals, ShippingPackage, ShippingRate};

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ama".to_owned(),
            last_name: "Mensah".to_owned(),
            email: "ama@example.com".to_owned(),
            phone: "+233200000000".to_owned(),
            company: String::new(),
            address_1: "12 Oxford St".to_owned(),
            address_2: String::new(),
            city: "Accra".to_owned(),
            state: "GA".to_owned(),
            postcode: "GA184".to_owned(),
            country: String::new(),
            payment_method: Some("paystack".to_owned()),
            customer_note: Some("  ".to_owned()),
        }
    }

    #[test]
    fn test_validate_ok() {
        let submission = valid_form().validate().unwrap();
        assert_eq!(submission.payment_method, "paystack");
        assert_eq!(submission.shipping.country, "GH");
        assert_eq!(
            submission.billing.email.as_deref(),
            Some("ama@example.com")
        );
        assert!(submission.shipping.email.is_none());
        // Whitespace-only note is dropped
        assert!(submission.customer_note.is_none());
    }

    #[test]
    fn test_validate_missing_required_field() {
        let mut form = valid_form();
        form.city = String::new();
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Please enter your city");
    }

    #[test]
    fn test_validate_bad_email() {
        let mut form = valid_form();
        form.email = "not-an-email".to_owned();
        assert!(form.validate().unwrap_err().starts_with("Invalid email"));
    }

    #[test]
    fn test_validate_unknown_payment_method() {
        let mut form = valid_form();
        form.payment_method = Some("bitcoin".to_owned());
        assert_eq!(
            form.validate().unwrap_err(),
            "Please choose a payment method"
        );

        form.payment_method = None;
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_summary_view_from_cart() {
        let cart = Cart {
            needs_shipping: true,
            shipping_rates: vec![ShippingPackage {
                package_id: 0,
                name: "Shipping".to_owned(),
                shipping_rates: vec![
                    ShippingRate {
                        rate_id: "flat_rate:1".to_owned(),
                        name: "Accra delivery".to_owned(),
                        price: "1000".to_owned(),
                        method_id: "flat_rate".to_owned(),
                        selected: true,
                        currency: crate::woo::types::CurrencyInfo::default(),
                    },
                    ShippingRate {
                        rate_id: "flat_rate:2".to_owned(),
                        name: "Nationwide".to_owned(),
                        price: "2500".to_owned(),
                        method_id: "flat_rate".to_owned(),
                        selected: false,
                        currency: crate::woo::types::CurrencyInfo::default(),
                    },
                ],
            }],
            totals: CartTotals {
                total_items: "9000".to_owned(),
                total_shipping: Some("1000".to_owned()),
                total_price: "10000".to_owned(),
                ..CartTotals::default()
            },
            ..Cart::default()
        };

        let summary = SummaryView::from(&cart);
        assert_eq!(summary.options.len(), 2);
        assert!(summary.options[0].selected);
        assert_eq!(summary.options[1].price, "₵25.00");
        assert_eq!(summary.shipping.as_deref(), Some("₵10.00"));
        assert_eq!(summary.total, "₵100.00");
        assert!(summary.needs_shipping);
    }

    #[test]
    fn test_payment_method_views_selection() {
        let views = payment_method_views("bacs");
        assert_eq!(views.len(), 3);
        assert!(!views[0].selected);
        assert!(views[1].selected);
    }
}
