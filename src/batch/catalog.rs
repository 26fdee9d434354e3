//! Product catalog collaborators

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// A product as listed by the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
}

impl ProductRecord {
    pub fn new(handle: &str, title: &str, description: &str) -> Self {
        Self {
            handle: handle.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            description_html: None,
        }
    }

    /// Text to extract attributes from; the HTML form wins when present
    pub fn source_text(&self) -> &str {
        match self.description_html.as_deref() {
            Some(html) if !html.trim().is_empty() => html,
            _ => &self.description,
        }
    }
}

/// Source of products to price
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>>;
}

/// Keep one record per handle. A later duplicate replaces the earlier
/// record but keeps its position.
pub fn dedupe_by_handle(products: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<ProductRecord> = Vec::with_capacity(products.len());

    for product in products {
        match index.get(&product.handle) {
            Some(&i) => unique[i] = product,
            None => {
                index.insert(product.handle.clone(), unique.len());
                unique.push(product);
            }
        }
    }

    unique
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<ProductRecord>),
    Wrapped { products: Vec<ProductRecord> },
}

/// Products read from a JSON file, either a bare array or `{"products": [...]}`
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Catalog for JsonFileCatalog {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::NotFound(format!("Cannot read catalog {}: {}", self.path.display(), e))
        })?;

        let products = match serde_json::from_str::<CatalogFile>(&raw)? {
            CatalogFile::List(products) => products,
            CatalogFile::Wrapped { products } => products,
        };

        info!(path = %self.path.display(), count = products.len(), "Loaded catalog");
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_description_preferred() {
        let mut product = ProductRecord::new("ring", "Ring", "Diamond Shape: Round");
        assert_eq!(product.source_text(), "Diamond Shape: Round");

        product.description_html = Some("   ".to_string());
        assert_eq!(product.source_text(), "Diamond Shape: Round");

        product.description_html = Some("<li>Diamond Shape: Oval</li>".to_string());
        assert_eq!(product.source_text(), "<li>Diamond Shape: Oval</li>");
    }

    #[test]
    fn test_dedupe_keeps_first_position_last_value() {
        let products = vec![
            ProductRecord::new("a", "First A", ""),
            ProductRecord::new("b", "B", ""),
            ProductRecord::new("a", "Second A", ""),
        ];
        let unique = dedupe_by_handle(products);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "Second A");
        assert_eq!(unique[1].handle, "b");
    }

    #[tokio::test]
    async fn test_json_file_catalog_formats() {
        let dir = tempfile::tempdir().unwrap();

        let list = dir.path().join("list.json");
        std::fs::write(
            &list,
            r#"[{"handle":"stud","title":"Stud","description":"14K Gold: 2g","descriptionHtml":"<p>14K Gold: 2g</p>"}]"#,
        )
        .unwrap();
        let products = JsonFileCatalog::new(&list).fetch_products().await.unwrap();
        assert_eq!(products[0].description_html.as_deref(), Some("<p>14K Gold: 2g</p>"));

        let wrapped = dir.path().join("wrapped.json");
        std::fs::write(&wrapped, r#"{"products":[{"handle":"band"}]}"#).unwrap();
        let products = JsonFileCatalog::new(&wrapped).fetch_products().await.unwrap();
        assert_eq!(products[0].handle, "band");
        assert_eq!(products[0].title, "");

        let missing = JsonFileCatalog::new(dir.path().join("nope.json"));
        assert!(matches!(missing.fetch_products().await, Err(AppError::NotFound(_))));
    }
}
