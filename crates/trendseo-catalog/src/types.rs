use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// One page of the Admin API `products.json` listing.
#[derive(Debug, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

/// The listing fields keyword research needs from a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: u64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub product_type: String,
    /// Comma-separated, as the Admin API returns it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vendor: String,
}

impl CatalogProduct {
    /// Trimmed, non-empty tags in listing order.
    #[must_use]
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    /// Case-insensitive match against whole tags.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        !wanted.is_empty()
            && self
                .tag_list()
                .iter()
                .any(|candidate| candidate.to_lowercase() == wanted)
    }
}

/// Distinct non-empty vendor names, first occurrence wins.
#[must_use]
pub fn distinct_vendors(products: &[CatalogProduct]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .map(|product| product.vendor.trim())
        .filter(|vendor| !vendor.is_empty() && seen.insert(vendor.to_lowercase()))
        .map(str::to_owned)
        .collect()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
