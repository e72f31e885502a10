use std::path::Path;

use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::CatalogSeed;

pub async fn read_seed_file(path: &Path) -> Result<CatalogSeed> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Upserts every category, then every product. Returns how many of each were
/// written.
pub async fn seed_catalog(db: &dyn DatabaseBackend, seed: &CatalogSeed) -> Result<(usize, usize)> {
    for category in &seed.categories {
        db.upsert_category(category).await?;
    }
    for product in &seed.products {
        db.upsert_product(product).await?;
    }

    tracing::info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Catalog seeded"
    );
    Ok((seed.categories.len(), seed.products.len()))
}
