//! Response schemas for the WooCommerce Store API.
//!
//! These mirror the JSON the API actually sends. List endpoints are queried
//! with a `_fields` projection, so most fields are `#[serde(default)]` -
//! a card payload carries only id, name, slug, prices, images, and stock
//! status.

use serde::{Deserialize, Serialize};

use shoko_core::{
    AttributeId, CategoryId, Currency, Money, OrderId, OrderStatus, ProductId, StockStatus, TermId,
    VariationId,
};

// =============================================================================
// Money Types
// =============================================================================

/// Currency block embedded in every price-bearing object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// ISO 4217 code.
    pub currency_code: String,
    /// Display symbol.
    pub currency_symbol: String,
    /// Number of minor-unit digits.
    pub currency_minor_unit: u32,
}

impl CurrencyInfo {
    /// Build a [`Currency`] for minor-unit arithmetic and display.
    #[must_use]
    pub fn currency(&self) -> Currency {
        Currency::new(
            self.currency_code.clone(),
            self.currency_symbol.clone(),
            self.currency_minor_unit,
        )
    }
}

impl Default for CurrencyInfo {
    fn default() -> Self {
        let currency = Currency::default();
        Self {
            currency_code: currency.code().to_owned(),
            currency_symbol: currency.symbol().to_owned(),
            currency_minor_unit: currency.minor_unit(),
        }
    }
}

/// Min/max of variation prices, sent for variable products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest variation price in minor units.
    pub min_amount: String,
    /// Highest variation price in minor units.
    pub max_amount: String,
}

/// Price block for a product or cart item.
///
/// All amounts are minor-unit integer strings (`"4500"` is ₵45.00 for a
/// two-minor-unit currency).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Prices {
    #[serde(flatten)]
    pub currency: CurrencyInfo,
    /// Current price.
    #[serde(default)]
    pub price: String,
    /// Price before any sale.
    #[serde(default)]
    pub regular_price: String,
    /// Sale price; empty string when not on sale.
    #[serde(default)]
    pub sale_price: String,
    /// Variation price range, for variable products.
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}

impl Prices {
    /// The current price as [`Money`]. Unparseable amounts render as zero.
    #[must_use]
    pub fn price(&self) -> Money {
        self.money(&self.price)
    }

    /// The pre-sale price as [`Money`].
    #[must_use]
    pub fn regular_price(&self) -> Money {
        self.money(&self.regular_price)
    }

    /// Whether the product is on sale (sale price set and below regular).
    #[must_use]
    pub fn on_sale(&self) -> bool {
        !self.sale_price.is_empty() && self.sale_price != self.regular_price
    }

    /// Variation price range as a `(min, max)` pair, when min and max
    /// actually differ. A variable product whose variations all cost the
    /// same renders as a single price.
    #[must_use]
    pub fn range(&self) -> Option<(Money, Money)> {
        let range = self.price_range.as_ref()?;
        if range.min_amount == range.max_amount {
            return None;
        }
        Some((self.money(&range.min_amount), self.money(&range.max_amount)))
    }

    fn money(&self, minor: &str) -> Money {
        let currency = self.currency.currency();
        Money::from_minor_str(minor, currency.clone()).unwrap_or_else(|_| Money::zero(currency))
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// Product or cart item image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub id: i64,
    /// Full-size image URL.
    pub src: String,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: String,
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Term reference embedded in a product attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTermRef {
    pub id: TermId,
    pub name: String,
    pub slug: String,
}

/// Attribute embedded in a product (e.g. Size with terms S/M/L).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub id: AttributeId,
    pub name: String,
    /// Taxonomy name, e.g. `pa_size`.
    #[serde(default)]
    pub taxonomy: Option<String>,
    /// Whether variations are keyed off this attribute.
    #[serde(default)]
    pub has_variations: bool,
    #[serde(default)]
    pub terms: Vec<AttributeTermRef>,
}

/// One attribute/value pair on a variation or cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    /// Attribute name, e.g. `Size`.
    #[serde(alias = "attribute")]
    pub name: String,
    /// Selected value, e.g. `M`.
    pub value: String,
}

/// Variation reference embedded in a variable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariationRef {
    pub id: VariationId,
    #[serde(default)]
    pub attributes: Vec<VariationAttribute>,
}

/// Product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Simple,
    Variable,
    Grouped,
    External,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL slug.
    pub slug: String,
    #[serde(rename = "type", default)]
    pub kind: ProductType,
    /// HTML description.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub sku: String,
    pub prices: Prices,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub categories: Vec<ProductCategoryRef>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub variations: Vec<ProductVariationRef>,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default = "default_true")]
    pub is_purchasable: bool,
    #[serde(default = "default_true")]
    pub is_in_stock: bool,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Whether a variation must be chosen before adding to the cart.
    #[must_use]
    pub fn requires_variation(&self) -> bool {
        matches!(self.kind, ProductType::Variable)
    }

    /// Find the variation matching a selected attribute value.
    ///
    /// Mirrors how the product form resolves a size button to a variation:
    /// the first variation carrying this attribute/value pair wins.
    #[must_use]
    pub fn variation_for(&self, attribute: &str, value: &str) -> Option<VariationId> {
        self.variations
            .iter()
            .find(|v| {
                v.attributes
                    .iter()
                    .any(|a| a.name.eq_ignore_ascii_case(attribute) && a.value == value)
            })
            .map(|v| v.id)
    }

    /// The product's primary category, used for recommendations.
    #[must_use]
    pub fn primary_category(&self) -> Option<&ProductCategoryRef> {
        self.categories.first()
    }
}

/// A product category (`GET /products/categories`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: i64,
    /// Number of published products in the category.
    #[serde(default)]
    pub count: i64,
}

/// A global product attribute (`GET /products/attributes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    /// Taxonomy name, e.g. `pa_color`.
    #[serde(default)]
    pub taxonomy: String,
    #[serde(default)]
    pub has_archives: bool,
}

impl Attribute {
    /// Slug used in filter query parameters: the taxonomy without its
    /// `pa_` prefix (`pa_color` filters as `attribute_color`).
    #[must_use]
    pub fn filter_slug(&self) -> &str {
        self.taxonomy.strip_prefix("pa_").unwrap_or(&self.taxonomy)
    }
}

/// A term of a global attribute (`GET /products/attributes/{id}/terms`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTerm {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub count: i64,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Per-line quantity limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityLimits {
    pub minimum: i64,
    pub maximum: i64,
    pub multiple_of: i64,
}

impl Default for QuantityLimits {
    fn default() -> Self {
        Self {
            minimum: 1,
            maximum: 9999,
            multiple_of: 1,
        }
    }
}

/// Line totals on a cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LineTotals {
    #[serde(flatten)]
    pub currency: CurrencyInfo,
    #[serde(default)]
    pub line_subtotal: String,
    #[serde(default)]
    pub line_total: String,
}

impl LineTotals {
    /// Line total (after discounts) as [`Money`].
    #[must_use]
    pub fn line_total(&self) -> Money {
        let currency = self.currency.currency();
        Money::from_minor_str(&self.line_total, currency.clone())
            .unwrap_or_else(|_| Money::zero(currency))
    }
}

/// A line item in the cart.
///
/// `key` is the server-assigned line identifier; all item mutations are
/// keyed on it, not on the product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default)]
    pub key: String,
    pub id: ProductId,
    pub name: String,
    /// Link back to the product page.
    #[serde(default)]
    pub permalink: String,
    pub quantity: i64,
    #[serde(default)]
    pub quantity_limits: QuantityLimits,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Selected variation attributes, empty for simple products.
    #[serde(default)]
    pub variation: Vec<VariationAttribute>,
    #[serde(default)]
    pub prices: Prices,
    #[serde(default)]
    pub totals: LineTotals,
}

/// Cart totals summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartTotals {
    #[serde(flatten)]
    pub currency: CurrencyInfo,
    #[serde(default)]
    pub total_items: String,
    #[serde(default)]
    pub total_shipping: Option<String>,
    #[serde(default)]
    pub total_discount: String,
    #[serde(default)]
    pub total_tax: String,
    #[serde(default)]
    pub total_price: String,
}

impl CartTotals {
    /// Items subtotal as [`Money`].
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.money(&self.total_items)
    }

    /// Grand total as [`Money`].
    #[must_use]
    pub fn total(&self) -> Money {
        self.money(&self.total_price)
    }

    /// Shipping total as [`Money`], when shipping has been calculated.
    #[must_use]
    pub fn shipping(&self) -> Option<Money> {
        self.total_shipping
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| self.money(s))
    }

    /// Coupon discount as [`Money`].
    #[must_use]
    pub fn discount(&self) -> Money {
        self.money(&self.total_discount)
    }

    fn money(&self, minor: &str) -> Money {
        let currency = self.currency.currency();
        Money::from_minor_str(minor, currency.clone()).unwrap_or_else(|_| Money::zero(currency))
    }
}

/// An applied coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCoupon {
    pub code: String,
}

/// A shipping rate option within a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub rate_id: String,
    pub name: String,
    /// Rate price in minor units.
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub method_id: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(flatten)]
    pub currency: CurrencyInfo,
}

impl ShippingRate {
    /// Rate price as [`Money`].
    #[must_use]
    pub fn price(&self) -> Money {
        let currency = self.currency.currency();
        Money::from_minor_str(&self.price, currency.clone())
            .unwrap_or_else(|_| Money::zero(currency))
    }
}

/// A shipping package with its selectable rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPackage {
    pub package_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shipping_rates: Vec<ShippingRate>,
}

/// The visitor's cart (`GET /cart` and every cart mutation response).
///
/// Mutations return the full updated cart; rendering always starts from
/// this, never from locally tracked state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub items_count: i64,
    #[serde(default)]
    pub coupons: Vec<CartCoupon>,
    #[serde(default)]
    pub shipping_rates: Vec<ShippingPackage>,
    #[serde(default)]
    pub needs_shipping: bool,
    #[serde(default)]
    pub totals: CartTotals,
}

impl Cart {
    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Checkout Types
// =============================================================================

/// Billing or shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    /// Billing only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Gateway result attached to a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaymentResult {
    #[serde(default)]
    pub payment_status: String,
    /// Gateway URL to send the customer to, when the method requires it.
    #[serde(default)]
    pub redirect_url: String,
}

/// Checkout state (`GET /checkout`, and the response to placing an order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub order_id: OrderId,
    #[serde(default)]
    pub order_key: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub billing_address: Address,
    #[serde(default)]
    pub shipping_address: Address,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub customer_note: String,
    #[serde(default)]
    pub payment_result: Option<PaymentResult>,
}

/// Body for `POST /checkout`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub billing_address: Address,
    pub shipping_address: Address,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
}

/// A placed order (`GET /order/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub totals: CartTotals,
    #[serde(default)]
    pub billing_address: Address,
}

// =============================================================================
// Error envelope
// =============================================================================

/// Store API error body: `{"code": ..., "message": ..., "data": {"status": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub data: Option<ApiErrorData>,
}

/// Error payload details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorData {
    #[serde(default)]
    pub status: u16,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> &'static str {
        r#"{
            "id": 712,
            "name": "Oversized Tee",
            "slug": "oversized-tee",
            "type": "variable",
            "description": "<p>Heavyweight cotton.</p>",
            "prices": {
                "currency_code": "GHS",
                "currency_symbol": "₵",
                "currency_minor_unit": 2,
                "price": "4500",
                "regular_price": "5000",
                "sale_price": "4500",
                "price_range": {"min_amount": "4500", "max_amount": "5500"}
            },
            "images": [{"id": 9, "src": "https://shoko.to/img/tee.jpg", "thumbnail": "https://shoko.to/img/tee-150.jpg", "alt": ""}],
            "categories": [{"id": 3, "name": "Tops", "slug": "tops"}],
            "attributes": [{
                "id": 1,
                "name": "Size",
                "taxonomy": "pa_size",
                "has_variations": true,
                "terms": [
                    {"id": 21, "name": "M", "slug": "m"},
                    {"id": 22, "name": "L", "slug": "l"}
                ]
            }],
            "variations": [
                {"id": 801, "attributes": [{"name": "Size", "value": "M"}]},
                {"id": 802, "attributes": [{"name": "Size", "value": "L"}]}
            ],
            "stock_status": "instock",
            "is_purchasable": true,
            "is_in_stock": true
        }"#
    }

    #[test]
    fn test_deserialize_product() {
        let product: Product = serde_json::from_str(product_json()).unwrap();
        assert_eq!(product.id.as_i64(), 712);
        assert_eq!(product.kind, ProductType::Variable);
        assert_eq!(product.stock_status, shoko_core::StockStatus::InStock);
        assert_eq!(product.variations.len(), 2);
        assert_eq!(product.primary_category().unwrap().slug, "tops");
    }

    #[test]
    fn test_deserialize_card_projection() {
        // What a `_fields`-projected list entry actually looks like.
        let json = r#"{
            "id": 5,
            "name": "Tote",
            "slug": "tote",
            "prices": {
                "currency_code": "GHS",
                "currency_symbol": "₵",
                "currency_minor_unit": 2,
                "price": "1500",
                "regular_price": "1500",
                "sale_price": ""
            },
            "images": [],
            "stock_status": "outofstock"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.kind, ProductType::Simple);
        assert!(product.variations.is_empty());
        assert_eq!(product.stock_status, shoko_core::StockStatus::OutOfStock);
        assert!(!product.prices.on_sale());
    }

    #[test]
    fn test_prices_helpers() {
        let product: Product = serde_json::from_str(product_json()).unwrap();
        assert_eq!(product.prices.price().format(), "₵45.00");
        assert_eq!(product.prices.regular_price().format(), "₵50.00");
        assert!(product.prices.on_sale());

        let (min, max) = product.prices.range().unwrap();
        assert_eq!(min.format(), "₵45.00");
        assert_eq!(max.format(), "₵55.00");
    }

    #[test]
    fn test_price_range_collapses_when_equal() {
        let prices = Prices {
            price_range: Some(PriceRange {
                min_amount: "4500".to_owned(),
                max_amount: "4500".to_owned(),
            }),
            ..Prices::default()
        };
        assert!(prices.range().is_none());
    }

    #[test]
    fn test_variation_lookup() {
        let product: Product = serde_json::from_str(product_json()).unwrap();
        assert_eq!(
            product.variation_for("Size", "L"),
            Some(VariationId::new(802))
        );
        assert_eq!(product.variation_for("size", "M"), Some(VariationId::new(801)));
        assert_eq!(product.variation_for("Size", "XXL"), None);
    }

    #[test]
    fn test_deserialize_cart() {
        let json = r#"{
            "items": [{
                "key": "c4ca4238a0b923820dcc509a6f75849b",
                "id": 712,
                "name": "Oversized Tee",
                "quantity": 2,
                "quantity_limits": {"minimum": 1, "maximum": 5, "multiple_of": 1},
                "images": [],
                "variation": [{"attribute": "Size", "value": "M"}],
                "prices": {
                    "currency_code": "GHS",
                    "currency_symbol": "₵",
                    "currency_minor_unit": 2,
                    "price": "4500",
                    "regular_price": "4500",
                    "sale_price": ""
                },
                "totals": {
                    "currency_code": "GHS",
                    "currency_symbol": "₵",
                    "currency_minor_unit": 2,
                    "line_subtotal": "9000",
                    "line_total": "9000"
                }
            }],
            "items_count": 2,
            "coupons": [{"code": "summer10"}],
            "needs_shipping": true,
            "shipping_rates": [{
                "package_id": 0,
                "name": "Shipping",
                "shipping_rates": [{
                    "rate_id": "flat_rate:1",
                    "name": "Accra delivery",
                    "price": "1000",
                    "method_id": "flat_rate",
                    "selected": true,
                    "currency_code": "GHS",
                    "currency_symbol": "₵",
                    "currency_minor_unit": 2
                }]
            }],
            "totals": {
                "currency_code": "GHS",
                "currency_symbol": "₵",
                "currency_minor_unit": 2,
                "total_items": "9000",
                "total_shipping": "1000",
                "total_discount": "900",
                "total_tax": "0",
                "total_price": "9100"
            }
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert!(!cart.is_empty());
        assert_eq!(cart.items_count, 2);
        assert_eq!(cart.items[0].variation[0].name, "Size");
        assert_eq!(cart.items[0].totals.line_total().format(), "₵90.00");
        assert_eq!(cart.totals.total().format(), "₵91.00");
        assert_eq!(cart.totals.shipping().unwrap().format(), "₵10.00");
        assert_eq!(cart.totals.discount().format(), "₵9.00");
        let rate = &cart.shipping_rates[0].shipping_rates[0];
        assert!(rate.selected);
        assert_eq!(rate.price().format(), "₵10.00");
    }

    #[test]
    fn test_empty_cart_shipping_total_absent() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert!(cart.totals.shipping().is_none());
    }

    #[test]
    fn test_attribute_filter_slug() {
        let attr = Attribute {
            id: AttributeId::new(1),
            name: "Color".to_owned(),
            taxonomy: "pa_color".to_owned(),
            has_archives: false,
        };
        assert_eq!(attr.filter_slug(), "color");

        let custom = Attribute {
            id: AttributeId::new(2),
            name: "Fit".to_owned(),
            taxonomy: "fit".to_owned(),
            has_archives: false,
        };
        assert_eq!(custom.filter_slug(), "fit");
    }

    #[test]
    fn test_address_serializes_without_empty_optionals() {
        let address = Address {
            first_name: "Ama".to_owned(),
            last_name: "Mensah".to_owned(),
            address_1: "12 Oxford St".to_owned(),
            city: "Accra".to_owned(),
            state: "GA".to_owned(),
            postcode: "GA184".to_owned(),
            country: "GH".to_owned(),
            phone: "+233200000000".to_owned(),
            ..Address::default()
        };
        let json = serde_json::to_value(&address).unwrap();
        assert!(json.get("company").is_none());
        assert!(json.get("address_2").is_none());
        assert!(json.get("email").is_none());
        assert_eq!(json["country"], "GH");
    }

    #[test]
    fn test_deserialize_error_envelope() {
        let json = r#"{
            "code": "woocommerce_rest_cart_coupon_error",
            "message": "Coupon \"SUMMER\" does not exist!",
            "data": {"status": 400}
        }"#;
        let body: ApiErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.code, "woocommerce_rest_cart_coupon_error");
        assert_eq!(body.data.unwrap().status, 400);
    }

    #[test]
    fn test_deserialize_checkout_result() {
        let json = r#"{
            "order_id": 1057,
            "order_key": "wc_order_abc123",
            "status": "pending",
            "payment_method": "paystack",
            "payment_result": {
                "payment_status": "success",
                "redirect_url": "https://paystack.example/pay/xyz"
            }
        }"#;
        let checkout: Checkout = serde_json::from_str(json).unwrap();
        assert_eq!(checkout.order_id.as_i64(), 1057);
        assert_eq!(checkout.status, OrderStatus::Pending);
        assert_eq!(
            checkout.payment_result.unwrap().redirect_url,
            "https://paystack.example/pay/xyz"
        );
    }
}
