//! Request and response bodies

use crate::pricing::extractor::DiamondDetails;
use crate::pricing::{ConfigUpdate, Karat, KaratPrices, PriceBreakdown, PricingConfig};
use crate::providers::SpotSource;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub preset: String,
    pub gold_price_cached: bool,
    pub admin_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub config: PricingConfig,
}

/// POST /api/pricing-config
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub config: ConfigUpdate,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// POST /api/pricing-config/reset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetConfigRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldPriceResponse {
    pub success: bool,
    pub city: String,
    /// 24K per gram, two decimals
    pub price: f64,
    pub unit: &'static str,
    pub date: Option<NaiveDate>,
    pub source: SpotSource,
    pub karat_rates: BTreeMap<Karat, f64>,
    pub next_update: DateTime<Utc>,
}

/// POST /api/price
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRequest {
    #[serde(default)]
    pub description: String,
    /// Price a single purity; all offered purities when absent
    #[serde(default)]
    pub karat: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PriceResponse {
    #[serde(rename_all = "camelCase")]
    Single {
        success: bool,
        karat: Karat,
        breakdown: PriceBreakdown,
        formatted_total: String,
    },
    #[serde(rename_all = "camelCase")]
    AllKarats {
        success: bool,
        spot_price: f64,
        details: DiamondDetails,
        prices: KaratPrices,
    },
}
