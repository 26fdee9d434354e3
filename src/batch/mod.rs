//! Catalog pricing runs
//!
//! ```text
//! Catalog --> ProductRecord[] --> run_batch --> BatchReport --> to_csv
//! ```

pub mod catalog;
pub mod export;
pub mod orchestrator;

pub use catalog::{dedupe_by_handle, Catalog, JsonFileCatalog, ProductRecord};
pub use export::{export_file_name, to_csv};
pub use orchestrator::{process_product, run_batch, BatchError, BatchReport, ProductPriceResult};
