//! Cache types for Store API catalog responses.
//!
//! Whole deserialized responses are cached, keyed by what was requested.
//! Product data expires after 2 minutes, the shop filter data (categories +
//! attributes + terms) after 5.

use std::time::{Duration, Instant};

use super::client::FilterData;
use super::types::Product;

/// TTL for product listings and single products.
pub const PRODUCTS_TTL: Duration = Duration::from_secs(2 * 60);

/// TTL for the shop filter data bundle.
pub const FILTER_DATA_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// A product listing, keyed by its canonical query string.
    Products(String),
    /// A single product, keyed by slug.
    Product(String),
    /// The one filter-data bundle.
    FilterData,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    FilterData(FilterData),
}

/// Per-entry expiry: filter data lives longer than product data.
pub struct CatalogExpiry;

impl moka::Expiry<CacheKey, CacheValue> for CatalogExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(match value {
            CacheValue::FilterData(_) => FILTER_DATA_TTL,
            CacheValue::Products(_) | CacheValue::Product(_) => PRODUCTS_TTL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moka::Expiry;

    #[test]
    fn test_expiry_by_value_kind() {
        let expiry = CatalogExpiry;
        let now = Instant::now();

        let ttl = expiry.expire_after_create(
            &CacheKey::Products("page=1".to_owned()),
            &CacheValue::Products(Vec::new()),
            now,
        );
        assert_eq!(ttl, Some(PRODUCTS_TTL));

        let ttl = expiry.expire_after_create(
            &CacheKey::FilterData,
            &CacheValue::FilterData(FilterData::default()),
            now,
        );
        assert_eq!(ttl, Some(FILTER_DATA_TTL));
    }
}
