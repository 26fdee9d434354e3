//! Export Service
//!
//! Prices a whole catalog and writes the CSV sheet.

use crate::batch::{dedupe_by_handle, export_file_name, run_batch, to_csv, BatchError, Catalog};
use crate::error::Result;
use crate::providers::SpotSource;
use crate::state::AppState;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of a catalog export
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub success: bool,
    pub path: PathBuf,
    pub exported: usize,
    pub failed: usize,
    pub errors: Vec<BatchError>,
    pub spot_price: f64,
    pub spot_source: SpotSource,
}

pub struct ExportService;

impl ExportService {
    /// Price every product in `catalog` and write
    /// `product-prices-<millis>.csv` under `out_dir`
    pub async fn export_catalog(
        state: &AppState,
        catalog: &dyn Catalog,
        out_dir: &Path,
    ) -> Result<ExportResult> {
        let config = state.config.get_config().await;
        let spot = state.gold.get_gold_price().await;
        info!(
            "ExportService::export_catalog - spot {:.2} ({:?}), config by {}",
            spot.price_24k, spot.source, config.updated_by
        );

        let products = catalog.fetch_products().await?;
        let fetched = products.len();
        let products = dedupe_by_handle(products);
        info!("Pricing {} unique products ({} listed)", products.len(), fetched);

        let report = run_batch(&products, &config, spot.price_24k);

        tokio::fs::create_dir_all(out_dir).await?;
        let path = out_dir.join(export_file_name(state.clock.now()));
        tokio::fs::write(&path, to_csv(&report.results)).await?;

        info!(path = %path.display(), "Wrote price sheet");

        Ok(ExportResult {
            success: true,
            path,
            exported: report.success_count(),
            failed: report.error_count(),
            errors: report.errors,
            spot_price: spot.price_24k,
            spot_source: spot.source,
        })
    }
}
