//! Product Quote Service
//!
//! Prices a single product description on demand. Results are memoized per
//! (description, karat, schedule stamp, spot price), so a schedule update
//! or a new gold quote naturally misses the cache.

use crate::error::Result;
use crate::pricing::extractor::{diamond_details, DiamondDetails};
use crate::pricing::{
    calculate, diamond_lines, extract, price_offered_karats, GoldWeightSet, Karat, KaratPrices,
    PriceBreakdown, PricingConfig,
};
use crate::providers::{ConfigProvider, GoldPriceProvider};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QuoteKey {
    description: String,
    karat: Karat,
    config_stamp: u64,
    spot_bits: u64,
}

/// Changes whenever any schedule value or its audit stamp changes
fn config_stamp(config: &PricingConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    serde_json::to_string(config)
        .unwrap_or_default()
        .hash(&mut hasher);
    hasher.finish()
}

impl QuoteKey {
    fn new(description: &str, karat: Karat, config: &PricingConfig, spot_24k: f64) -> Self {
        Self {
            description: description.to_string(),
            karat,
            config_stamp: config_stamp(config),
            spot_bits: spot_24k.to_bits(),
        }
    }
}

/// Result of pricing one product in every offered karat
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteAllResult {
    pub success: bool,
    pub spot_price: f64,
    pub details: DiamondDetails,
    pub prices: KaratPrices,
}

/// Memoized quotes kept before the cache starts over
const QUOTE_CACHE_LIMIT: usize = 4096;

pub struct PricingService {
    config: Arc<ConfigProvider>,
    gold: Arc<GoldPriceProvider>,
    cache: DashMap<QuoteKey, PriceBreakdown>,
    cache_limit: usize,
}

impl PricingService {
    pub fn new(config: Arc<ConfigProvider>, gold: Arc<GoldPriceProvider>) -> Self {
        Self {
            config,
            gold,
            cache: DashMap::new(),
            cache_limit: QUOTE_CACHE_LIMIT,
        }
    }

    /// Price `description` in the purity named by `karat_label`.
    ///
    /// Returns `None` for an unrecognized label. A purity the product lists
    /// no weight for is priced with zero gold.
    pub async fn quote(&self, description: &str, karat_label: &str) -> Option<PriceBreakdown> {
        let karat = match karat_label.parse::<Karat>() {
            Ok(karat) => karat,
            Err(e) => {
                warn!(karat = karat_label, error = %e, "Unrecognized karat, no quote");
                return None;
            }
        };

        let config = self.config.get_config().await;
        let spot = self.gold.get_gold_price().await.price_24k;
        let key = QuoteKey::new(description, karat, &config, spot);

        if let Some(cached) = self.cache.get(&key) {
            return Some(*cached);
        }

        let spec = extract(description);
        let diamonds = diamond_lines(&spec);
        let grams = GoldWeightSet::from_spec(&spec).weight(karat);
        let breakdown = calculate(&diamonds, grams, Some(karat), &config, spot);

        debug!(karat = %karat, total = breakdown.total, "Quoted product");
        self.remember(key, breakdown);
        Some(breakdown)
    }

    /// Price `description` in every karat it lists a gold weight for
    pub async fn quote_all_karats(&self, description: &str) -> Result<QuoteAllResult> {
        let config = self.config.get_config().await;
        let spot = self.gold.get_gold_price().await.price_24k;

        let spec = extract(description);
        let diamonds = diamond_lines(&spec);
        let gold = GoldWeightSet::from_spec(&spec);

        let prices = price_offered_karats(&diamonds, &gold, &config, spot);
        for (karat, breakdown) in prices.iter() {
            if let Some(breakdown) = breakdown {
                self.remember(QuoteKey::new(description, *karat, &config, spot), *breakdown);
            }
        }

        Ok(QuoteAllResult {
            success: true,
            spot_price: spot,
            details: diamond_details(&spec),
            prices,
        })
    }

    /// Store a quote, dropping every memoized entry once the limit is hit
    fn remember(&self, key: QuoteKey, breakdown: PriceBreakdown) {
        if self.cache.len() >= self.cache_limit && !self.cache.contains_key(&key) {
            debug!(entries = self.cache.len(), "Quote cache full, clearing");
            self.cache.clear();
        }
        self.cache.insert(key, breakdown);
    }

    pub fn cached_quotes(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::db::SqliteDb;
    use crate::pricing::MarginPreset;
    use crate::providers::FixedQuoteSource;
    use crate::security::AdminGate;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    const SOLITAIRE: &str = "Diamond Shape: Round\nDiamond Weight: 0.5\nTotal Diamonds: 2\n\
        Total Diamond Carat: 1.0\nDiamond Quality: VS-GH\n18K Gold: 5g\n14K Gold: 4.2g";

    fn service() -> (Arc<ConfigProvider>, PricingService) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 2, 6, 0, 0).unwrap(),
        ));
        let db = Arc::new(SqliteDb::open_in_memory().unwrap());
        let config = Arc::new(ConfigProvider::new(
            db,
            MarginPreset::Standard,
            AdminGate::new(Some("pw")),
            clock.clone(),
            Duration::from_secs(300),
        ));
        let gold = Arc::new(GoldPriceProvider::new(
            Arc::new(FixedQuoteSource::new(7000.0).unwrap()),
            clock,
            8,
            6500.0,
        ));
        (config.clone(), PricingService::new(config, gold))
    }

    #[tokio::test]
    async fn test_quote_matches_worked_example() {
        let (_, service) = service();
        let price = service.quote(SOLITAIRE, "18K").await.unwrap();
        assert_eq!(price.total, 51237);
        assert_eq!(service.cached_quotes(), 1);

        let again = service.quote(SOLITAIRE, "18k").await.unwrap();
        assert_eq!(again, price);
        assert_eq!(service.cached_quotes(), 1);
    }

    #[tokio::test]
    async fn test_unknown_karat_has_no_quote() {
        let (_, service) = service();
        assert!(service.quote(SOLITAIRE, "22K").await.is_none());
        assert_eq!(service.cached_quotes(), 0);
    }

    #[tokio::test]
    async fn test_missing_weight_prices_zero_gold() {
        let (_, service) = service();
        let price = service.quote(SOLITAIRE, "10K").await.unwrap();
        assert_eq!(price.gold_price, 0);
        assert_eq!(price.making_charge, 0);
        assert_eq!(price.diamond_price, 17370);
    }

    #[tokio::test]
    async fn test_config_update_misses_cache() {
        let (config, service) = service();
        let before = service.quote(SOLITAIRE, "18K").await.unwrap();

        let mut update = crate::pricing::ConfigUpdate {
            diamond_margins: Some(MarginPreset::Standard.config(Utc::now()).diamond_margins),
            making_charges: Some(MarginPreset::Standard.config(Utc::now()).making_charges),
            gst_rate: Some(0.05),
        };
        update.diamond_margins.as_mut().unwrap().base_fees.fee2 = 0.0;
        config.update(Some("pw"), update, None).await.unwrap();

        let after = service.quote(SOLITAIRE, "18K").await.unwrap();
        assert_eq!(after.diamond_price, before.diamond_price - 700);
        assert_ne!(after.gst, before.gst);
        assert_eq!(service.cached_quotes(), 2);

        service.clear_cache();
        assert_eq!(service.cached_quotes(), 0);
    }

    #[tokio::test]
    async fn test_quote_all_karats() {
        let (_, service) = service();
        let result = service.quote_all_karats(SOLITAIRE).await.unwrap();
        assert_eq!(result.spot_price, 7000.0);
        assert_eq!(
            result.details,
            DiamondDetails {
                carat: "1.0".to_string(),
                quality: "VS-GH".to_string(),
                shape: "Round".to_string(),
                count: "2".to_string(),
            }
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json["details"],
            serde_json::json!({"carat": "1.0", "quality": "VS-GH", "shape": "Round", "count": "2"})
        );
        assert_eq!(result.prices.len(), 2);
        assert_eq!(result.prices[&Karat::K18].unwrap().total, 51237);
        assert!(!result.prices.contains_key(&Karat::K10));
    }

    #[tokio::test]
    async fn test_quote_cache_is_bounded() {
        let (_, mut service) = service();
        service.cache_limit = 2;

        service.quote(SOLITAIRE, "18K").await.unwrap();
        service.quote(SOLITAIRE, "14K").await.unwrap();
        assert_eq!(service.cached_quotes(), 2);

        // a repeat of a cached quote does not evict anything
        service.quote(SOLITAIRE, "18K").await.unwrap();
        assert_eq!(service.cached_quotes(), 2);

        let price = service.quote(SOLITAIRE, "10K").await.unwrap();
        assert_eq!(price.diamond_price, 17370);
        assert_eq!(service.cached_quotes(), 1);
    }
}
