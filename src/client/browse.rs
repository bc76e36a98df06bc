use crate::core::{Catalog, PriceEntry, Product};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl From<Option<&str>> for CategoryFilter {
    fn from(value: Option<&str>) -> Self {
        match value {
            None => CategoryFilter::All,
            Some(s) if s.eq_ignore_ascii_case("all") => CategoryFilter::All,
            Some(s) => CategoryFilter::Only(s.to_string()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => f.write_str(c),
        }
    }
}

/// Case-insensitive substring match on the name, exact match on category.
pub fn filter_products<'a>(
    catalog: &'a Catalog,
    query: &str,
    category: &CategoryFilter,
) -> Vec<&'a Product> {
    let needle = query.to_lowercase();
    catalog
        .products()
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle) && category.matches(&p.category))
        .collect()
}

/// `All` first, then each category in first-seen order.
pub fn categories(catalog: &Catalog) -> Vec<CategoryFilter> {
    let mut out = vec![CategoryFilter::All];
    for product in catalog.products() {
        let candidate = CategoryFilter::Only(product.category.clone());
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Cheapest entry; the earliest one wins a tie.
pub fn lowest_price(prices: &[PriceEntry]) -> Option<&PriceEntry> {
    prices.iter().fold(None, |best: Option<&PriceEntry>, entry| match best {
        Some(b) if b.price <= entry.price => Some(b),
        _ => Some(entry),
    })
}
