//! Services Layer
//!
//! Pricing logic shared between CLI commands and REST API handlers.
//!
//! # Architecture
//!
//! ```text
//! CLI ───────┐
//!            ├──> Services --> Providers (config, gold) --> pricing core
//! REST API ──┘
//! ```
//!
//! # Services
//!
//! - `PricingService` - Quote a single product description
//! - `ExportService` - Price a catalog and write the CSV sheet

pub mod export_service;
pub mod pricing_service;

pub use export_service::{ExportResult, ExportService};
pub use pricing_service::{PricingService, QuoteAllResult};
