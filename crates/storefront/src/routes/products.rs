//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::filters;
use crate::routes::shop::{ImageView, ProductCardView};
use crate::state::AppState;
use crate::woo::query::CARD_FIELDS;
use crate::woo::types::Product;
use crate::woo::{ProductQuery, StoreApiError};

/// Products fetched for the recommendation strip.
const RECOMMENDED_COUNT: u32 = 20;

// =============================================================================
// Views
// =============================================================================

/// A selectable variation option (one term button on the product form).
#[derive(Clone)]
pub struct VariationOptionView {
    /// The variation resolved for this term, submitted as `variation_id`.
    pub variation_id: i64,
    pub label: String,
}

/// An attribute picker (e.g. Size) on the product form.
#[derive(Clone)]
pub struct AttributePickerView {
    pub name: String,
    pub options: Vec<VariationOptionView>,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// HTML description straight from the catalog.
    pub description: String,
    pub price: String,
    pub regular_price: Option<String>,
    pub images: Vec<ImageView>,
    pub pickers: Vec<AttributePickerView>,
    pub requires_variation: bool,
    pub sold_out: bool,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let prices = &product.prices;
        // Variable products with differing variation prices show the range;
        // everything else shows the single price.
        let price = prices.range().map_or_else(
            || prices.price().format(),
            |(min, max)| format!("{} - {}", min.format(), max.format()),
        );
        let regular_price = (prices.on_sale() && prices.range().is_none())
            .then(|| prices.regular_price().format());

        // Only attributes that drive variations become pickers, and only
        // terms that resolve to an actual variation become options.
        let pickers = product
            .attributes
            .iter()
            .filter(|attr| attr.has_variations)
            .map(|attr| AttributePickerView {
                name: attr.name.clone(),
                options: attr
                    .terms
                    .iter()
                    .filter_map(|term| {
                        product.variation_for(&attr.name, &term.name).map(|id| {
                            VariationOptionView {
                                variation_id: id.as_i64(),
                                label: term.name.clone(),
                            }
                        })
                    })
                    .collect(),
            })
            .filter(|picker| !picker.options.is_empty())
            .collect();

        Self {
            id: product.id.as_i64(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price,
            regular_price,
            images: product
                .images
                .iter()
                .map(|img| ImageView {
                    url: img.src.clone(),
                    alt: img.alt.clone(),
                })
                .collect(),
            pickers,
            requires_variation: product.requires_variation(),
            sold_out: !(product.is_purchasable && product.is_in_stock),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub recommended: Vec<ProductCardView>,
}

/// Product not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub slug: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product detail page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let product = match state.store().product_by_slug(&slug).await {
        Ok(product) => product,
        Err(StoreApiError::NotFound(_)) => {
            return (StatusCode::NOT_FOUND, ProductNotFoundTemplate { slug }).into_response();
        }
        Err(e) => {
            tracing::error!("Failed to fetch product {slug}: {e}");
            return (StatusCode::NOT_FOUND, ProductNotFoundTemplate { slug }).into_response();
        }
    };

    let recommended = recommended_for(&state, &product).await;

    ProductShowTemplate {
        product: ProductDetailView::from(&product),
        recommended,
    }
    .into_response()
}

/// Up to twenty products from the product's first category, excluding the
/// product itself. Failures degrade to an empty strip.
async fn recommended_for(state: &AppState, product: &Product) -> Vec<ProductCardView> {
    let Some(category) = product.primary_category() else {
        return Vec::new();
    };

    let query = ProductQuery::new()
        .category(category.slug.clone())
        .per_page(RECOMMENDED_COUNT)
        .exclude([product.id])
        .fields(CARD_FIELDS);

    match state.store().products(&query).await {
        Ok(products) => products.iter().map(ProductCardView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to load recommended products: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::woo::types::{
        AttributeTermRef, Prices, PriceRange, ProductAttribute, ProductType, ProductVariationRef,
        VariationAttribute,
    };
    use shoko_core::{AttributeId, ProductId, StockStatus, TermId, VariationId};

    fn variable_product() -> Product {
        Product {
            id: ProductId::new(712),
            name: "Oversized Tee".to_owned(),
            slug: "oversized-tee".to_owned(),
            kind: ProductType::Variable,
            description: "<p>Heavyweight cotton.</p>".to_owned(),
            short_description: String::new(),
            sku: String::new(),
            prices: Prices {
                price: "4500".to_owned(),
                regular_price: "4500".to_owned(),
                price_range: Some(PriceRange {
                    min_amount: "4500".to_owned(),
                    max_amount: "5500".to_owned(),
                }),
                ..Prices::default()
            },
            images: Vec::new(),
            categories: Vec::new(),
            attributes: vec![ProductAttribute {
                id: AttributeId::new(1),
                name: "Size".to_owned(),
                taxonomy: Some("pa_size".to_owned()),
                has_variations: true,
                terms: vec![
                    AttributeTermRef {
                        id: TermId::new(21),
                        name: "M".to_owned(),
                        slug: "m".to_owned(),
                    },
                    AttributeTermRef {
                        id: TermId::new(22),
                        name: "L".to_owned(),
                        slug: "l".to_owned(),
                    },
                    // No variation carries XXL; it must not render.
                    AttributeTermRef {
                        id: TermId::new(23),
                        name: "XXL".to_owned(),
                        slug: "xxl".to_owned(),
                    },
                ],
            }],
            variations: vec![
                ProductVariationRef {
                    id: VariationId::new(801),
                    attributes: vec![VariationAttribute {
                        name: "Size".to_owned(),
                        value: "M".to_owned(),
                    }],
                },
                ProductVariationRef {
                    id: VariationId::new(802),
                    attributes: vec![VariationAttribute {
                        name: "Size".to_owned(),
                        value: "L".to_owned(),
                    }],
                },
            ],
            stock_status: StockStatus::InStock,
            is_purchasable: true,
            is_in_stock: true,
        }
    }

    #[test]
    fn test_detail_view_price_range() {
        let view = ProductDetailView::from(&variable_product());
        assert_eq!(view.price, "₵45.00 - ₵55.00");
        assert!(view.regular_price.is_none());
        assert!(view.requires_variation);
    }

    #[test]
    fn test_detail_view_pickers_skip_unmatched_terms() {
        let view = ProductDetailView::from(&variable_product());
        assert_eq!(view.pickers.len(), 1);
        let picker = &view.pickers[0];
        assert_eq!(picker.name, "Size");
        assert_eq!(picker.options.len(), 2);
        assert_eq!(picker.options[0].variation_id, 801);
        assert_eq!(picker.options[1].label, "L");
    }

    #[test]
    fn test_detail_view_simple_product_has_no_pickers() {
        let mut product = variable_product();
        product.kind = ProductType::Simple;
        product.attributes.clear();
        product.variations.clear();
        product.prices.price_range = None;
        let view = ProductDetailView::from(&product);
        assert!(view.pickers.is_empty());
        assert!(!view.requires_variation);
        assert_eq!(view.price, "₵45.00");
    }

    #[test]
    fn test_detail_view_sold_out() {
        let mut product = variable_product();
        product.is_in_stock = false;
        assert!(ProductDetailView::from(&product).sold_out);
    }
}
