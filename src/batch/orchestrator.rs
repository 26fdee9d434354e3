//! Batch pricing over a product list

use crate::batch::catalog::ProductRecord;
use crate::error::{AppError, Result};
use crate::pricing::extractor::{self, SpecMap};
use crate::pricing::product::split_list;
use crate::pricing::{
    diamond_lines, extract, price_offered_karats, DiamondLine, GoldWeightSet, KaratPrices,
    PricingConfig,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Priced product row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPriceResult {
    pub handle: String,
    pub title: String,
    pub gold_weights: GoldWeightSet,
    pub diamonds: Vec<DiamondLine>,
    pub diamond_shapes: String,
    pub total_diamonds: String,
    pub diamond_weight_each: String,
    pub total_diamond_weight: String,
    pub size: String,
    pub dimensions: String,
    pub prices: KaratPrices,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchError {
    pub handle: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub results: Vec<ProductPriceResult>,
    pub errors: Vec<BatchError>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.results.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

fn field(spec: &SpecMap, label: &str) -> String {
    spec.get(label).cloned().unwrap_or_default()
}

/// Extract and price one product
pub fn process_product(
    product: &ProductRecord,
    config: &PricingConfig,
    spot_24k: f64,
) -> Result<ProductPriceResult> {
    let handle = product.handle.trim();
    if handle.is_empty() {
        return Err(AppError::Validation("Product has no handle".to_string()));
    }

    let spec = extract(product.source_text());
    debug!(handle, labels = spec.len(), "Extracted product attributes");

    let gold_weights = GoldWeightSet::from_spec(&spec);
    if let Some((karat, grams)) = gold_weights.offered().find(|(_, g)| !g.is_finite()) {
        return Err(AppError::Validation(format!(
            "{} gold weight is not a finite number ({})",
            karat, grams
        )));
    }

    let diamonds = diamond_lines(&spec);
    let prices = price_offered_karats(&diamonds, &gold_weights, config, spot_24k);

    Ok(ProductPriceResult {
        handle: handle.to_string(),
        title: product.title.clone(),
        gold_weights,
        diamonds,
        diamond_shapes: split_list(spec.get(extractor::DIAMOND_SHAPE)).join(", "),
        total_diamonds: split_list(spec.get(extractor::TOTAL_DIAMONDS)).join(", "),
        diamond_weight_each: split_list(spec.get(extractor::DIAMOND_WEIGHT)).join(", "),
        total_diamond_weight: field(&spec, extractor::TOTAL_DIAMOND_WEIGHT),
        size: field(&spec, extractor::SIZE),
        dimensions: field(&spec, extractor::DIMENSIONS),
        prices,
    })
}

/// Price every product in order. A failing product is recorded and the
/// run continues.
pub fn run_batch(products: &[ProductRecord], config: &PricingConfig, spot_24k: f64) -> BatchReport {
    let mut report = BatchReport::default();

    for product in products {
        match process_product(product, config, spot_24k) {
            Ok(result) => report.results.push(result),
            Err(e) => {
                warn!(handle = %product.handle, error = %e, "Failed to price product");
                report.errors.push(BatchError {
                    handle: product.handle.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        priced = report.success_count(),
        failed = report.error_count(),
        "Batch pricing complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{Karat, MarginPreset};
    use chrono::Utc;

    const PENDANT: &str = "<ul>\
        <li><strong>Diamond Shape:</strong> Round, Princess</li>\
        <li><strong>Diamond Weight:</strong> 0.5, 1.2</li>\
        <li><strong>Total Diamonds:</strong> 4, 2</li>\
        <li><strong>Total Diamond Weight:</strong> 4.4ct</li>\
        <li><strong>14K Gold:</strong> 3.2g</li>\
        <li><strong>18K Gold:</strong> 3.6 gm</li>\
        <li><strong>Dimensions:</strong> 12 x 8 mm</li>\
        </ul>";

    fn config() -> PricingConfig {
        MarginPreset::Standard.config(Utc::now())
    }

    #[test]
    fn test_process_product_fields() {
        let mut product = ProductRecord::new("halo-pendant", "Halo \"Star\" Pendant", "");
        product.description_html = Some(PENDANT.to_string());

        let result = process_product(&product, &config(), 7000.0).unwrap();
        assert_eq!(result.diamond_shapes, "Round, Princess");
        assert_eq!(result.diamond_weight_each, "0.5, 1.2");
        assert_eq!(result.total_diamonds, "4, 2");
        assert_eq!(result.total_diamond_weight, "4.4ct");
        assert_eq!(result.dimensions, "12 x 8 mm");
        assert_eq!(result.size, "");
        assert_eq!(result.diamonds.len(), 2);
        assert_eq!(result.diamonds[1], DiamondLine::new("princess", 1.2, 2));

        assert!(!result.prices.contains_key(&Karat::K10));
        assert!(result.prices[&Karat::K14].is_some());
        assert!(result.prices[&Karat::K18].is_some());
        assert_eq!(result.gold_weights.weight(Karat::K18), 3.6);
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let products = vec![
            ProductRecord::new("", "No handle", "14K Gold: 2g"),
            ProductRecord::new("band", "Band", "14K Gold: 4g"),
            ProductRecord::new("huge", "Broken", "14K Gold: 1e400g"),
        ];

        let report = run_batch(&products, &config(), 7000.0);
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.results[0].handle, "band");
        assert_eq!(report.errors[1].handle, "huge");
    }

    #[test]
    fn test_product_without_gold_has_no_prices() {
        let products = vec![ProductRecord::new("loose", "Loose stone", "Diamond Shape: Round")];
        let report = run_batch(&products, &config(), 7000.0);
        assert!(report.results[0].prices.is_empty());
    }
}
