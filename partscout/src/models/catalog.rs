use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A storefront product as seen through the read-only catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    /// Resolved category name, absent for uncategorized products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// The flattened product shape handed to the similarity prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateProduct {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
}

impl From<&Product> for CandidateProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category_name.clone().unwrap_or_default(),
            description: product.description.clone(),
        }
    }
}

/// Contents of a `--seed-catalog` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
}
