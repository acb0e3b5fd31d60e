//! Store API client implementation.
//!
//! Plain REST calls with `reqwest`; catalog responses cached with `moka`.
//! Cart and checkout methods take the visitor's [`CartToken`] and are never
//! cached - every mutation returns the full updated cart.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use shoko_core::OrderId;

use crate::config::WooStoreConfig;

use super::cache::{CacheKey, CacheValue, CatalogExpiry};
use super::types::{
    Address, ApiErrorBody, Attribute, AttributeTerm, Cart, Category, Checkout, Order, OrderRequest,
    Product,
};
use super::{CartToken, ProductQuery, StoreApiError};

/// Categories, attributes, and attribute terms for the shop filter sidebar.
///
/// Fetched and cached as one bundle, the way the filter UI consumes it.
#[derive(Debug, Clone, Default)]
pub struct FilterData {
    pub categories: Vec<Category>,
    pub attributes: Vec<AttributeWithTerms>,
}

/// A global attribute together with its terms.
#[derive(Debug, Clone)]
pub struct AttributeWithTerms {
    pub attribute: Attribute,
    pub terms: Vec<AttributeTerm>,
}

// =============================================================================
// StoreApiClient
// =============================================================================

/// Client for the WooCommerce Store API.
///
/// Cheaply cloneable; all clones share the HTTP connection pool and the
/// catalog cache.
#[derive(Clone)]
pub struct StoreApiClient {
    inner: Arc<StoreApiClientInner>,
}

struct StoreApiClientInner {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StoreApiClient {
    /// Create a new Store API client.
    #[must_use]
    pub fn new(config: &WooStoreConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .expire_after(CatalogExpiry)
            .build();

        Self {
            inner: Arc::new(StoreApiClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_url.as_str().trim_end_matches('/').to_owned(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// GET a catalog or cart resource.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        token: Option<&CartToken>,
    ) -> Result<T, StoreApiError> {
        let mut request = self.inner.http.get(self.url(path)).query(query);
        if let Some(token) = token {
            request = request.header("Cart-Token", token.as_str());
        }
        decode(request.send().await?).await
    }

    /// Send a cart/checkout request with a JSON body.
    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: &CartToken,
    ) -> Result<T, StoreApiError> {
        let mut request = self
            .inner
            .http
            .request(method, self.url(path))
            .header("Cart-Token", token.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }
        decode(request.send().await?).await
    }

    // =========================================================================
    // Catalog Methods (cached)
    // =========================================================================

    /// Get a product listing.
    ///
    /// Unfiltered listings are cached per page; filtered ones always hit
    /// the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, query))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreApiError> {
        let cacheable = query.is_cacheable();
        let cache_key = CacheKey::Products(query.cache_key());

        if cacheable
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get("/products", &query.to_params(), None).await?;

        if cacheable {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Get a single product by its slug.
    ///
    /// # Errors
    ///
    /// Returns [`StoreApiError::NotFound`] if no product has this slug, or
    /// an error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, StoreApiError> {
        let cache_key = CacheKey::Product(slug.to_owned());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let query = ProductQuery::new().slug(slug);
        let mut products: Vec<Product> = self.get("/products", &query.to_params(), None).await?;

        if products.is_empty() {
            return Err(StoreApiError::NotFound(format!("product {slug}")));
        }
        let product = products.swap_remove(0);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get all product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, StoreApiError> {
        self.get("/products/categories", &[], None).await
    }

    /// Get all global product attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn attributes(&self) -> Result<Vec<Attribute>, StoreApiError> {
        self.get("/products/attributes", &[], None).await
    }

    /// Get the terms of one attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(attribute_id = %attribute_id))]
    pub async fn attribute_terms(
        &self,
        attribute_id: shoko_core::AttributeId,
    ) -> Result<Vec<AttributeTerm>, StoreApiError> {
        let path = format!("/products/attributes/{attribute_id}/terms");
        self.get(&path, &[], None).await
    }

    /// Get the filter sidebar data: categories plus attributes with terms.
    ///
    /// Cached as one bundle for 5 minutes. An attribute whose term fetch
    /// fails is kept with an empty term list rather than failing the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the category or attribute listing fails.
    #[instrument(skip(self))]
    pub async fn filter_data(&self) -> Result<FilterData, StoreApiError> {
        if let Some(CacheValue::FilterData(data)) = self.inner.cache.get(&CacheKey::FilterData).await
        {
            debug!("Cache hit for filter data");
            return Ok(data);
        }

        let categories = self.categories().await?;
        let attributes = self.attributes().await?;

        let mut with_terms = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let terms = match self.attribute_terms(attribute.id).await {
                Ok(terms) => terms,
                Err(e) => {
                    warn!(attribute = %attribute.name, "Failed to fetch attribute terms: {e}");
                    Vec::new()
                }
            };
            with_terms.push(AttributeWithTerms { attribute, terms });
        }

        let data = FilterData {
            categories,
            attributes: with_terms,
        };

        self.inner
            .cache
            .insert(CacheKey::FilterData, CacheValue::FilterData(data.clone()))
            .await;

        Ok(data)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the visitor's cart.
    ///
    /// An unknown token is not an error: the API answers with an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &CartToken) -> Result<Cart, StoreApiError> {
        self.get("/cart", &[], Some(token)).await
    }

    /// Add an item to the cart.
    ///
    /// `id` is the variation id when one is selected, otherwise the product
    /// id.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be added (e.g. out of stock).
    #[instrument(skip(self, token), fields(id = %id, quantity = %quantity))]
    pub async fn add_item(
        &self,
        token: &CartToken,
        id: i64,
        quantity: u32,
    ) -> Result<Cart, StoreApiError> {
        let body = AddItemRequest { id, quantity };
        self.send(Method::POST, "/cart/add-item", Some(&body), token)
            .await
    }

    /// Update a cart line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the line key is unknown or the API request fails.
    #[instrument(skip(self, token), fields(key = %key, quantity = %quantity))]
    pub async fn update_item(
        &self,
        token: &CartToken,
        key: &str,
        quantity: u32,
    ) -> Result<Cart, StoreApiError> {
        let body = UpdateItemRequest { key, quantity };
        self.send(Method::POST, "/cart/update-item", Some(&body), token)
            .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line key is unknown or the API request fails.
    #[instrument(skip(self, token), fields(key = %key))]
    pub async fn remove_item(&self, token: &CartToken, key: &str) -> Result<Cart, StoreApiError> {
        let body = RemoveItemRequest { key };
        self.send(Method::POST, "/cart/remove-item", Some(&body), token)
            .await
    }

    /// Remove every item from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn clear(&self, token: &CartToken) -> Result<Cart, StoreApiError> {
        self.send::<(), _>(Method::DELETE, "/cart/items", None, token)
            .await
    }

    /// Apply a coupon code.
    ///
    /// # Errors
    ///
    /// Returns the API's rejection message for invalid codes.
    #[instrument(skip(self, token, code))]
    pub async fn apply_coupon(&self, token: &CartToken, code: &str) -> Result<Cart, StoreApiError> {
        let body = CouponRequest { code };
        self.send(Method::POST, "/cart/apply-coupon", Some(&body), token)
            .await
    }

    /// Remove an applied coupon code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not applied or the request fails.
    #[instrument(skip(self, token, code))]
    pub async fn remove_coupon(&self, token: &CartToken, code: &str) -> Result<Cart, StoreApiError> {
        let body = CouponRequest { code };
        self.send(Method::POST, "/cart/remove-coupon", Some(&body), token)
            .await
    }

    /// Select a shipping rate for a package.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is unknown or the API request fails.
    #[instrument(skip(self, token), fields(package_id = %package_id, rate_id = %rate_id))]
    pub async fn select_shipping_rate(
        &self,
        token: &CartToken,
        package_id: i64,
        rate_id: &str,
    ) -> Result<Cart, StoreApiError> {
        let body = SelectShippingRequest {
            package_id,
            rate_id,
        };
        self.send(Method::POST, "/cart/select-shipping-rate", Some(&body), token)
            .await
    }

    /// Update the customer's addresses, re-pricing shipping.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn update_customer(
        &self,
        token: &CartToken,
        billing: &Address,
        shipping: Option<&Address>,
    ) -> Result<Cart, StoreApiError> {
        let body = UpdateCustomerRequest {
            billing_address: billing,
            shipping_address: shipping,
        };
        self.send(Method::POST, "/cart/update-customer", Some(&body), token)
            .await
    }

    // =========================================================================
    // Checkout Methods
    // =========================================================================

    /// Get the current checkout state for the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn checkout(&self, token: &CartToken) -> Result<Checkout, StoreApiError> {
        self.get("/checkout", &[], Some(token)).await
    }

    /// Place the order.
    ///
    /// # Errors
    ///
    /// Returns the API's message for rejected orders (address validation,
    /// stock changes, payment setup).
    #[instrument(skip(self, token, request))]
    pub async fn place_order(
        &self,
        token: &CartToken,
        request: &OrderRequest,
    ) -> Result<Checkout, StoreApiError> {
        self.send(Method::POST, "/checkout", Some(request), token)
            .await
    }

    /// Get a placed order for the confirmation page.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(&self, order_id: OrderId) -> Result<Order, StoreApiError> {
        let path = format!("/order/{order_id}");
        self.get(&path, &[], None).await
    }
}

// =============================================================================
// Request bodies
// =============================================================================

#[derive(Debug, Serialize)]
struct AddItemRequest {
    id: i64,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateItemRequest<'a> {
    key: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct RemoveItemRequest<'a> {
    key: &'a str,
}

#[derive(Debug, Serialize)]
struct CouponRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct SelectShippingRequest<'a> {
    package_id: i64,
    rate_id: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateCustomerRequest<'a> {
    billing_address: &'a Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_address: Option<&'a Address>,
}

// =============================================================================
// Response decoding
// =============================================================================

/// Decode a Store API response, mapping error statuses to [`StoreApiError`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(StoreApiError::RateLimited(retry_after));
    }

    // Read the body as text first for better error diagnostics
    let text = response.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => StoreApiError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
            },
            Err(_) => {
                tracing::error!(
                    status = %status,
                    body = %text.chars().take(500).collect::<String>(),
                    "Store API returned non-success status with unexpected body"
                );
                StoreApiError::Api {
                    status: status.as_u16(),
                    code: "http_error".to_owned(),
                    message: format!("HTTP {status}"),
                }
            }
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse Store API response"
        );
        StoreApiError::Decode(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_body_shape() {
        let body = AddItemRequest {
            id: 801,
            quantity: 2,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"id": 801, "quantity": 2}));
    }

    #[test]
    fn test_update_item_body_shape() {
        let body = UpdateItemRequest {
            key: "c4ca4238",
            quantity: 3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"key": "c4ca4238", "quantity": 3}));
    }

    #[test]
    fn test_update_customer_omits_missing_shipping() {
        let billing = Address {
            first_name: "Ama".to_owned(),
            ..Address::default()
        };
        let body = UpdateCustomerRequest {
            billing_address: &billing,
            shipping_address: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("shipping_address").is_none());
        assert_eq!(json["billing_address"]["first_name"], "Ama");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = WooStoreConfig {
            api_url: "https://shoko.to/wp-json/wc/store/v1/".parse().unwrap(),
        };
        let client = StoreApiClient::new(&config);
        assert_eq!(
            client.url("/products"),
            "https://shoko.to/wp-json/wc/store/v1/products"
        );
    }
}
