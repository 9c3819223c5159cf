//! `catalog` command: analyze every product tagged for a keyword update.

use std::sync::Arc;

use trendseo_catalog::{distinct_vendors, CatalogClient, CatalogSettings};
use trendseo_core::{AppConfig, MarketProfile};

use crate::analyze::{analyze_product, build_pipeline};
use crate::output;

/// Fetch tagged products and analyze them one after another.
///
/// Catalog vendor names join the scorer's brand list so branded keywords are
/// treated as lower competition.
///
/// # Errors
///
/// Returns an error if catalog credentials are missing, the catalog cannot be
/// listed, or the trends pipeline cannot be built.
pub(crate) async fn run_catalog(
    config: &AppConfig,
    profile: Arc<MarketProfile>,
    limit: Option<usize>,
    skip_trends: bool,
    display: usize,
) -> anyhow::Result<()> {
    let settings = CatalogSettings::from_config(config)?;
    let client = CatalogClient::new(&settings)?;
    let products = client.fetch_tagged_products(limit).await?;

    if products.is_empty() {
        println!("no products tagged '{}' found", client.update_tag());
        return Ok(());
    }

    let vendors = distinct_vendors(&products);
    let pipeline = build_pipeline(config, profile)?.with_additional_brands(&vendors);
    tracing::info!(
        products = products.len(),
        vendors = vendors.len(),
        "analyzing catalog products"
    );

    for (index, product) in products.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("[{}/{}] product {}", index + 1, products.len(), product.id);
        let result =
            analyze_product(&pipeline, &product.title, &product.product_type, skip_trends).await;
        output::print_analysis(&result, display);
    }

    Ok(())
}
