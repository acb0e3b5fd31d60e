//! WooCommerce Store API client.
//!
//! # Architecture
//!
//! - Plain REST + JSON via `reqwest`; response schemas deserialized with
//!   `serde` in [`types`]
//! - WooCommerce is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog responses (2 minute TTL for
//!   product listings, 5 minutes for filter data)
//! - Cart and checkout requests carry the visitor's anonymous `Cart-Token`
//!   header; catalog requests never do
//!
//! # Example
//!
//! ```rust,ignore
//! use shoko_storefront::woo::{CartToken, StoreApiClient};
//!
//! let client = StoreApiClient::new(&config.woo);
//!
//! // Get a product
//! let product = client.product_by_slug("oversized-tee").await?;
//!
//! // Add it to an anonymous cart
//! let token = CartToken::generate();
//! let cart = client.add_item(&token, product.id.as_i64(), 1).await?;
//! ```

mod cache;
mod client;
pub mod query;
pub mod types;

pub use client::{AttributeWithTerms, FilterData, StoreApiClient};
pub use query::{OrderBy, ProductQuery, SortOrder};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the Store API.
#[derive(Debug, Error)]
pub enum StoreApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error envelope.
    #[error("Store API error ({code}): {message}")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// Machine-readable error code, e.g. `woocommerce_rest_cart_coupon_error`.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl StoreApiError {
    /// The API's human-readable message, when one was returned.
    ///
    /// Cart mutations use this to surface coupon/stock rejections inline
    /// instead of a generic failure banner.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Anonymous cart session identifier.
///
/// Sent as the `Cart-Token` header so the Store API can associate a visitor
/// session with server-side cart state. Generated once per visitor session
/// and reused for every cart and checkout call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(String);

impl CartToken {
    /// Generate a fresh random token (128-bit, URL-safe base64).
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The token value for the `Cart-Token` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreApiError::NotFound("product oversized-tee".to_string());
        assert_eq!(err.to_string(), "Not found: product oversized-tee");

        let err = StoreApiError::Api {
            status: 400,
            code: "woocommerce_rest_cart_coupon_error".to_string(),
            message: "Coupon \"SUMMER\" does not exist!".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Store API error (woocommerce_rest_cart_coupon_error): Coupon \"SUMMER\" does not exist!"
        );
    }

    #[test]
    fn test_rate_limited_display() {
        let err = StoreApiError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }

    #[test]
    fn test_user_message_only_for_api_errors() {
        let err = StoreApiError::Api {
            status: 400,
            code: "x".to_string(),
            message: "Sorry, this product cannot be purchased.".to_string(),
        };
        assert_eq!(
            err.user_message(),
            Some("Sorry, this product cannot be purchased.")
        );
        assert!(StoreApiError::NotFound("x".to_string()).user_message().is_none());
    }

    #[test]
    fn test_cart_token_generate_unique() {
        let a = CartToken::generate();
        let b = CartToken::generate();
        assert_ne!(a, b);
        // 16 bytes -> 22 chars of unpadded base64
        assert_eq!(a.as_str().len(), 22);
    }

    #[test]
    fn test_cart_token_url_safe() {
        let token = CartToken::generate();
        assert!(
            token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
