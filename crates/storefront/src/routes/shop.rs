//! Shop listing route handlers.
//!
//! The listing page loads the filter sidebar plus the first page of twelve
//! products; further pages arrive as HTMX fragments through an
//! `hx-trigger="revealed"` sentinel at the bottom of the grid. Changing any
//! filter is a fresh page-1 request - there is no grid to append to.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::woo::query::SHOP_PAGE_SIZE;
use crate::woo::types::Product;
use crate::woo::{FilterData, ProductQuery};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Product card display data (grid cells, home strip, recommendations).
#[derive(Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub price: String,
    /// Pre-sale price, shown struck through next to a sale price.
    pub regular_price: Option<String>,
    pub image: Option<ImageView>,
    pub sold_out: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let prices = &product.prices;
        let price = prices.range().map_or_else(
            || prices.price().format(),
            |(min, max)| format!("{} - {}", min.format(), max.format()),
        );
        let regular_price = (prices.on_sale() && prices.range().is_none())
            .then(|| prices.regular_price().format());

        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            price,
            regular_price,
            image: product.images.first().map(|img| ImageView {
                url: if img.thumbnail.is_empty() {
                    img.src.clone()
                } else {
                    img.thumbnail.clone()
                },
                alt: img.alt.clone(),
            }),
            sold_out: !product.stock_status.is_purchasable(),
        }
    }
}

/// One selectable filter option (category or attribute term).
#[derive(Clone)]
pub struct FilterOptionView {
    pub name: String,
    pub selected: bool,
    /// Listing URL with this option toggled.
    pub url: String,
}

/// An attribute group in the filter sidebar.
#[derive(Clone)]
pub struct FilterGroupView {
    pub name: String,
    pub options: Vec<FilterOptionView>,
}

/// The filter sidebar.
#[derive(Clone, Default)]
pub struct FilterSidebarView {
    pub categories: Vec<FilterOptionView>,
    pub attributes: Vec<FilterGroupView>,
}

/// A page of product cards plus the URL of the next fragment, when the
/// page was full.
#[derive(Clone)]
pub struct GridView {
    pub cards: Vec<ProductCardView>,
    pub next_url: Option<String>,
}

// =============================================================================
// Filter state
// =============================================================================

/// Selected shop filters, parsed from the query string.
///
/// Categories come as `category=<slug,...>`, attribute terms as
/// `attribute_<slug>=<term,...>` - the same parameter shapes the listing
/// endpoint takes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopFilters {
    pub page: u32,
    pub categories: Vec<String>,
    /// `(attribute filter slug, selected term slugs)`.
    pub attributes: Vec<(String, Vec<String>)>,
}

impl ShopFilters {
    /// Parse from request query parameters.
    #[must_use]
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let page = params
            .get("page")
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let categories = params
            .get("category")
            .map(|csv| split_csv(csv))
            .unwrap_or_default();

        let mut attributes: Vec<(String, Vec<String>)> = params
            .iter()
            .filter_map(|(key, value)| {
                let slug = key.strip_prefix("attribute_")?;
                let terms = split_csv(value);
                (!terms.is_empty()).then(|| (slug.to_owned(), terms))
            })
            .collect();
        attributes.sort();

        Self {
            page,
            categories,
            attributes,
        }
    }

    /// The same filters pointing at a different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Toggle a category selection, resetting to page 1.
    #[must_use]
    pub fn toggle_category(&self, slug: &str) -> Self {
        let mut categories = self.categories.clone();
        if let Some(pos) = categories.iter().position(|c| c == slug) {
            categories.remove(pos);
        } else {
            categories.push(slug.to_owned());
        }
        Self {
            page: 1,
            categories,
            attributes: self.attributes.clone(),
        }
    }

    /// Toggle an attribute term selection, resetting to page 1.
    #[must_use]
    pub fn toggle_term(&self, attribute: &str, term: &str) -> Self {
        let mut attributes = self.attributes.clone();
        if let Some((_, terms)) = attributes.iter_mut().find(|(slug, _)| slug == attribute) {
            if let Some(pos) = terms.iter().position(|t| t == term) {
                terms.remove(pos);
            } else {
                terms.push(term.to_owned());
            }
        } else {
            attributes.push((attribute.to_owned(), vec![term.to_owned()]));
        }
        attributes.retain(|(_, terms)| !terms.is_empty());
        attributes.sort();
        Self {
            page: 1,
            categories: self.categories.clone(),
            attributes,
        }
    }

    /// Whether a category is selected.
    #[must_use]
    pub fn has_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c == slug)
    }

    /// Whether an attribute term is selected.
    #[must_use]
    pub fn has_term(&self, attribute: &str, term: &str) -> bool {
        self.attributes
            .iter()
            .any(|(slug, terms)| slug == attribute && terms.iter().any(|t| t == term))
    }

    /// Build the listing request for these filters.
    #[must_use]
    pub fn to_product_query(&self) -> ProductQuery {
        let mut query = ProductQuery::new()
            .per_page(SHOP_PAGE_SIZE)
            .page(self.page)
            .fields(crate::woo::query::CARD_FIELDS);
        if !self.categories.is_empty() {
            query = query.category(self.categories.join(","));
        }
        for (slug, terms) in &self.attributes {
            query = query.attribute(slug.clone(), terms.join(","));
        }
        query
    }

    /// Render as a query string (no leading `?`), page included only past
    /// the first.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut parts = Vec::new();
        if self.page > 1 {
            parts.push(format!("page={}", self.page));
        }
        if !self.categories.is_empty() {
            parts.push(format!("category={}", self.categories.join(",")));
        }
        for (slug, terms) in &self.attributes {
            parts.push(format!("attribute_{slug}={}", terms.join(",")));
        }
        parts.join("&")
    }

    /// Listing page URL for these filters.
    #[must_use]
    pub fn page_url(&self) -> String {
        let qs = self.query_string();
        if qs.is_empty() {
            "/shop".to_owned()
        } else {
            format!("/shop?{qs}")
        }
    }

    /// Grid fragment URL for these filters.
    #[must_use]
    pub fn fragment_url(&self) -> String {
        let qs = self.query_string();
        if qs.is_empty() {
            "/shop/products".to_owned()
        } else {
            format!("/shop/products?{qs}")
        }
    }
}

fn split_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Build the grid view from a fetched page.
fn grid_view(products: &[Product], filters: &ShopFilters) -> GridView {
    let cards: Vec<ProductCardView> = products.iter().map(ProductCardView::from).collect();
    // A full page means there may be more; a short page ends the scroll.
    let next_url = (products.len() as u32 == SHOP_PAGE_SIZE)
        .then(|| filters.with_page(filters.page + 1).fragment_url());
    GridView { cards, next_url }
}

/// Build the filter sidebar from catalog data and current selections.
fn sidebar_view(data: &FilterData, filters: &ShopFilters) -> FilterSidebarView {
    let categories = data
        .categories
        .iter()
        .map(|category| FilterOptionView {
            name: category.name.clone(),
            selected: filters.has_category(&category.slug),
            url: filters.toggle_category(&category.slug).page_url(),
        })
        .collect();

    let attributes = data
        .attributes
        .iter()
        .filter(|entry| !entry.terms.is_empty())
        .map(|entry| {
            let slug = entry.attribute.filter_slug();
            FilterGroupView {
                name: entry.attribute.name.clone(),
                options: entry
                    .terms
                    .iter()
                    .map(|term| FilterOptionView {
                        name: term.name.clone(),
                        selected: filters.has_term(slug, &term.slug),
                        url: filters.toggle_term(slug, &term.slug).page_url(),
                    })
                    .collect(),
            }
        })
        .collect();

    FilterSidebarView {
        categories,
        attributes,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Shop listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub title: String,
    /// Category name when the listing is scoped to one, for the breadcrumb.
    pub category_name: Option<String>,
    pub sidebar: FilterSidebarView,
    pub grid: GridView,
}

/// Product grid fragment template (for HTMX infinite scroll).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: GridView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the shop listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let filters = ShopFilters::from_query(&params);
    render_listing(&state, filters, None).await
}

/// Display the shop listing pre-filtered to a category slug.
#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let mut filters = ShopFilters::from_query(&params);
    if !filters.has_category(&category) {
        filters.categories.push(category.clone());
    }
    render_listing(&state, filters, Some(category)).await
}

async fn render_listing(
    state: &AppState,
    filters: ShopFilters,
    category_slug: Option<String>,
) -> ShopIndexTemplate {
    // Filter data degrades to an empty sidebar; the grid is the page.
    let filter_data = match state.store().filter_data().await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to load filter data: {e}");
            FilterData::default()
        }
    };

    let products = match state.store().products(&filters.to_product_query()).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load products: {e}");
            Vec::new()
        }
    };

    let category_name = category_slug.as_ref().and_then(|slug| {
        filter_data
            .categories
            .iter()
            .find(|c| &c.slug == slug)
            .map(|c| c.name.clone())
    });
    let title = category_name
        .clone()
        .unwrap_or_else(|| "Must haves from shoko.to".to_owned());

    ShopIndexTemplate {
        title,
        category_name,
        sidebar: sidebar_view(&filter_data, &filters),
        grid: grid_view(&products, &filters),
    }
}

/// Product grid fragment for infinite scroll and filter changes.
#[instrument(skip(state))]
pub async fn products_fragment(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let filters = ShopFilters::from_query(&params);

    let products = match state.store().products(&filters.to_product_query()).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load products page {}: {e}", filters.page);
            Vec::new()
        }
    };

    ProductGridTemplate {
        grid: grid_view(&products, &filters),
    }
}
