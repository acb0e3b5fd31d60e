//! Query builder for `GET /products`.
//!
//! The listing endpoint takes pagination, category and attribute filters,
//! sort options, and a `_fields` projection that keeps card payloads small.

use shoko_core::ProductId;

/// Fields requested for product cards (listing pages and strips).
pub const CARD_FIELDS: &[&str] = &["id", "name", "prices", "images", "slug", "stock_status"];

/// Products per listing page; a short page means the listing is exhausted.
pub const SHOP_PAGE_SIZE: u32 = 12;

/// Sort field for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Date,
    Title,
    Price,
    Popularity,
}

impl OrderBy {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Title => "title",
            Self::Price => "price",
            Self::Popularity => "popularity",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Parameters for a product listing request.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    per_page: Option<u32>,
    page: Option<u32>,
    category: Option<String>,
    /// `(filter slug, comma-separated term slugs)` pairs, sent as
    /// `attribute_<slug>=<terms>`.
    attributes: Vec<(String, String)>,
    orderby: Option<OrderBy>,
    order: Option<SortOrder>,
    exclude: Vec<ProductId>,
    slug: Option<String>,
    fields: Option<&'static [&'static str]>,
}

impl ProductQuery {
    /// Empty query (API defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The default storefront listing: newest first, card fields only.
    #[must_use]
    pub fn latest(per_page: u32) -> Self {
        Self::new()
            .per_page(per_page)
            .orderby(OrderBy::Date)
            .order(SortOrder::Desc)
            .fields(CARD_FIELDS)
    }

    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Filter by category slug(s), comma-separated.
    #[must_use]
    pub fn category(mut self, slugs: impl Into<String>) -> Self {
        self.category = Some(slugs.into());
        self
    }

    /// Filter by an attribute's term slugs, comma-separated.
    #[must_use]
    pub fn attribute(mut self, slug: impl Into<String>, terms: impl Into<String>) -> Self {
        self.attributes.push((slug.into(), terms.into()));
        self
    }

    #[must_use]
    pub fn orderby(mut self, orderby: OrderBy) -> Self {
        self.orderby = Some(orderby);
        self
    }

    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Exclude specific products (used for the recommendation strip).
    #[must_use]
    pub fn exclude(mut self, ids: impl IntoIterator<Item = ProductId>) -> Self {
        self.exclude.extend(ids);
        self
    }

    /// Look up by slug (single-product fetch).
    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Restrict the response to the given fields.
    #[must_use]
    pub fn fields(mut self, fields: &'static [&'static str]) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Whether this query may be served from and stored in the cache.
    ///
    /// Only unfiltered listings are cached; the shop always refetches
    /// filtered results.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.category.is_none()
            && self.attributes.is_empty()
            && self.exclude.is_empty()
            && self.slug.is_none()
    }

    /// Canonical cache key: the query string with parameters in emission
    /// order. Attribute pairs are sorted so equivalent filter sets collide.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.to_params()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Render as request query parameters.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(per_page) = self.per_page {
            params.push(("per_page".to_owned(), per_page.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page".to_owned(), page.to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category".to_owned(), category.clone()));
        }

        let mut attributes = self.attributes.clone();
        attributes.sort();
        for (slug, terms) in attributes {
            params.push((format!("attribute_{slug}"), terms));
        }

        if let Some(orderby) = self.orderby {
            params.push(("orderby".to_owned(), orderby.as_str().to_owned()));
        }
        if let Some(order) = self.order {
            params.push(("order".to_owned(), order.as_str().to_owned()));
        }
        if !self.exclude.is_empty() {
            let ids = self
                .exclude
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("exclude".to_owned(), ids));
        }
        if let Some(slug) = &self.slug {
            params.push(("slug".to_owned(), slug.clone()));
        }
        if let Some(fields) = self.fields {
            params.push(("_fields".to_owned(), fields.join(",")));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_params() {
        let params = ProductQuery::latest(10).to_params();
        assert!(params.contains(&("per_page".to_owned(), "10".to_owned())));
        assert!(params.contains(&("orderby".to_owned(), "date".to_owned())));
        assert!(params.contains(&("order".to_owned(), "desc".to_owned())));
        assert!(params.contains(&(
            "_fields".to_owned(),
            "id,name,prices,images,slug,stock_status".to_owned()
        )));
    }

    #[test]
    fn test_attribute_filter_params() {
        let params = ProductQuery::new()
            .per_page(12)
            .page(2)
            .category("tops")
            .attribute("size", "m,l")
            .to_params();
        assert!(params.contains(&("category".to_owned(), "tops".to_owned())));
        assert!(params.contains(&("attribute_size".to_owned(), "m,l".to_owned())));
        assert!(params.contains(&("page".to_owned(), "2".to_owned())));
    }

    #[test]
    fn test_exclude_joined() {
        let params = ProductQuery::new()
            .exclude([ProductId::new(7), ProductId::new(12)])
            .to_params();
        assert!(params.contains(&("exclude".to_owned(), "7,12".to_owned())));
    }

    #[test]
    fn test_cacheable_only_without_filters() {
        assert!(ProductQuery::latest(10).is_cacheable());
        assert!(ProductQuery::latest(12).page(3).is_cacheable());
        assert!(!ProductQuery::new().category("tops").is_cacheable());
        assert!(!ProductQuery::new().attribute("size", "m").is_cacheable());
        assert!(!ProductQuery::new().slug("tote").is_cacheable());
        assert!(!ProductQuery::new().exclude([ProductId::new(1)]).is_cacheable());
    }

    #[test]
    fn test_cache_key_distinguishes_pages() {
        let page1 = ProductQuery::latest(12).page(1).cache_key();
        let page2 = ProductQuery::latest(12).page(2).cache_key();
        assert_ne!(page1, page2);
    }

    #[test]
    fn test_cache_key_attribute_order_insensitive() {
        let a = ProductQuery::new()
            .attribute("size", "m")
            .attribute("color", "black")
            .cache_key();
        let b = ProductQuery::new()
            .attribute("color", "black")
            .attribute("size", "m")
            .cache_key();
        assert_eq!(a, b);
    }
}
