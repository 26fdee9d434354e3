//! Pricing engine
//!
//! Description text flows through the extractor into diamond lines and gold
//! weights, which the calculator prices against the live schedule and gold
//! spot price.
//!
//! ```text
//! description --> extractor --> product (DiamondLine, GoldWeightSet)
//!                                   |
//!       PricingConfig + spot 24K --> calculator --> PriceBreakdown
//! ```

pub mod calculator;
pub mod config;
pub mod extractor;
pub mod format;
pub mod karat;
pub mod product;
pub mod rates;

pub use calculator::{calculate, PriceBreakdown};
pub use config::{ConfigUpdate, MarginPreset, PricingConfig};
pub use extractor::{extract, SpecMap};
pub use karat::Karat;
pub use product::{diamond_lines, DiamondLine, GoldWeightSet};

use std::collections::BTreeMap;

/// Price for every offered purity; karats without gold weight are absent
pub type KaratPrices = BTreeMap<Karat, Option<PriceBreakdown>>;

/// Price every karat the product is offered in.
pub fn price_offered_karats(
    diamonds: &[DiamondLine],
    gold: &GoldWeightSet,
    config: &PricingConfig,
    spot_24k: f64,
) -> KaratPrices {
    gold.offered()
        .map(|(karat, grams)| {
            let breakdown = calculate(diamonds, grams, Some(karat), config, spot_24k);
            (karat, Some(breakdown))
        })
        .collect()
}
