//! Catalog filtering and ordering

use std::{cmp::Reverse, str::FromStr};

use thiserror::Error;

use crate::{
    catalog::{Product, ProductId},
    users::UserId,
};

/// Unrecognised sort name.
#[derive(Debug, Error)]
#[error("unknown catalog sort: {0}")]
pub struct UnknownSort(pub String);

/// Catalog ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogSort {
    /// Most recently published first; undated products last.
    #[default]
    Newest,

    /// Cheapest first.
    PriceLowToHigh,

    /// Most expensive first.
    PriceHighToLow,

    /// Alphabetical by title, ignoring case.
    Title,
}

impl FromStr for CatalogSort {
    type Err = UnknownSort;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "price-asc" | "price_low_to_high" => Ok(Self::PriceLowToHigh),
            "price-desc" | "price_high_to_low" => Ok(Self::PriceHighToLow),
            "title" => Ok(Self::Title),
            _ => Err(UnknownSort(value.to_string())),
        }
    }
}

/// Criteria a product must meet to be listed. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive text matched against title and description.
    pub query: Option<String>,

    /// Exact file type, ignoring case.
    pub file_type: Option<String>,

    /// Delivery kind (`file` or `url`).
    pub delivery: Option<String>,

    /// Inclusive price ceiling.
    pub max_price: Option<u64>,

    /// Publishing author.
    pub author: Option<UserId>,

    /// Products to leave out, e.g. ones already in the cart.
    pub exclude: Vec<ProductId>,
}

impl CatalogFilter {
    /// Whether `product` satisfies every set criterion.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = query.to_lowercase();
            let in_title = product.title.to_lowercase().contains(&needle);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));

            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(file_type) = &self.file_type
            && !product
                .file_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(file_type))
        {
            return false;
        }

        if let Some(delivery) = &self.delivery
            && !product.delivery.kind().eq_ignore_ascii_case(delivery)
        {
            return false;
        }

        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        if self.author.as_ref().is_some_and(|a| *a != product.author_id) {
            return false;
        }

        !self.exclude.contains(&product.id)
    }
}

/// Filter and order `products` for display.
pub fn browse<'a>(
    products: &'a [Product],
    filter: &CatalogFilter,
    sort: CatalogSort,
) -> Vec<&'a Product> {
    let mut listed: Vec<&Product> = products.iter().filter(|p| filter.matches(p)).collect();

    match sort {
        CatalogSort::Newest => listed.sort_by_key(|p| Reverse(p.created_at)),
        CatalogSort::PriceLowToHigh => listed.sort_by_key(|p| p.price),
        CatalogSort::PriceHighToLow => listed.sort_by_key(|p| Reverse(p.price)),
        CatalogSort::Title => listed.sort_by_cached_key(|p| p.title.to_lowercase()),
    }

    listed
}
