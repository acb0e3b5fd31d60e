//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::routes::shop::ProductCardView;
use crate::state::AppState;
use crate::woo::ProductQuery;

/// Number of products in the "latest" strip.
const LATEST_COUNT: u32 = 10;

/// Collection link in the category section.
#[derive(Clone)]
pub struct CollectionView {
    pub name: String,
    pub url: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub latest: Vec<ProductCardView>,
    pub collections: Vec<CollectionView>,
}

/// Display the home page.
///
/// Both sections degrade to empty on API failure; the page itself always
/// renders.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let latest = match state.store().products(&ProductQuery::latest(LATEST_COUNT)).await {
        Ok(products) => products.iter().map(ProductCardView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to load latest products: {e}");
            Vec::new()
        }
    };

    let collections = match state.store().categories().await {
        Ok(categories) => categories
            .iter()
            .filter(|category| category.count > 0)
            .map(|category| CollectionView {
                name: category.name.clone(),
                url: format!("/shop/{}", category.slug),
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to load categories: {e}");
            Vec::new()
        }
    };

    HomeTemplate {
        latest,
        collections,
    }
}
