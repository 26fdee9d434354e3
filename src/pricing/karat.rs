//! Gold purity tiers

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gold purity offered for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Karat {
    #[serde(rename = "10K")]
    K10,
    #[serde(rename = "14K")]
    K14,
    #[serde(rename = "18K")]
    K18,
}

impl Karat {
    pub const ALL: [Karat; 3] = [Karat::K10, Karat::K14, Karat::K18];

    pub fn number(self) -> u32 {
        match self {
            Karat::K10 => 10,
            Karat::K14 => 14,
            Karat::K18 => 18,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Karat::K10 => "10K",
            Karat::K14 => "14K",
            Karat::K18 => "18K",
        }
    }

    /// Share of pure gold relative to 24K
    pub fn fraction(self) -> f64 {
        self.number() as f64 / 24.0
    }

    /// Per-gram rate for this purity given the 24K spot price
    pub fn gold_rate(self, spot_24k: f64) -> f64 {
        spot_24k * self.fraction()
    }
}

impl FromStr for Karat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('K')
            .or_else(|| trimmed.strip_suffix('k'))
            .unwrap_or(trimmed)
            .trim();
        match digits {
            "10" => Ok(Karat::K10),
            "14" => Ok(Karat::K14),
            "18" => Ok(Karat::K18),
            _ => Err(AppError::Validation(format!("Unsupported karat: {}", s))),
        }
    }
}

impl fmt::Display for Karat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
