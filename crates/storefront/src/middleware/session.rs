//! Session middleware configuration and cart token access.
//!
//! Sessions are cookie-backed with an in-memory store - the only thing kept
//! in them is the visitor's anonymous cart token, which the commerce
//! backend uses to look up cart state. Nothing here needs to survive a
//! restart; an expired session simply means a fresh (empty) cart.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::instrument;

use crate::config::StorefrontConfig;
use crate::woo::CartToken;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shoko_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session keys.
pub mod session_keys {
    /// The visitor's anonymous cart token.
    pub const CART_TOKEN: &str = "cart.token";
}

/// Create the session layer with the in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Get the cart token from the session, if the visitor has one.
pub async fn cart_token(session: &Session) -> Option<CartToken> {
    session
        .get::<CartToken>(session_keys::CART_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Get the cart token, generating and storing one if this is the visitor's
/// first cart interaction.
///
/// # Errors
///
/// Returns an error if the session store rejects the insert.
#[instrument(skip(session))]
pub async fn ensure_cart_token(
    session: &Session,
) -> Result<CartToken, tower_sessions::session::Error> {
    if let Some(token) = cart_token(session).await {
        return Ok(token);
    }

    let token = CartToken::generate();
    session.insert(session_keys::CART_TOKEN, &token).await?;
    Ok(token)
}
