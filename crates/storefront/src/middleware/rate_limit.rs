//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Cart and checkout mutations hit the commerce backend on every request,
//! so they get a per-IP limiter. Catalog pages are served from cache and
//! are left unlimited.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

/// Rate limiter layer type for Axum.
///
/// `SmartIpKeyExtractor` resolves the real client IP from standard proxy
/// headers before falling back to the peer address.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for cart and checkout mutations: ~60 requests per
/// minute per IP.
///
/// Configuration: 1 request per second (replenish), burst of 30. Generous
/// enough for quantity-stepper mashing, tight enough to stop abuse.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(30)`), which are always
/// accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn cart_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(1)
        .burst_size(30)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(30) is valid");
    GovernorLayer::new(Arc::new(config))
}
