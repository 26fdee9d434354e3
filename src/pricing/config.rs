//! Pricing schedule model
//!
//! The JSON form keeps the camelCase field names used by the admin surface
//! (`diamondMargins.lessThan1ct.flatAddition`, `gstRate`, ...).

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier and flat amount applied to a diamond line's base cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margin {
    pub multiplier: f64,
    pub flat_addition: f64,
}

/// Flat fees added once per priced product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseFees {
    pub fee1: f64,
    pub fee2: f64,
}

impl BaseFees {
    pub fn total(&self) -> f64 {
        self.fee1 + self.fee2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiamondMargins {
    #[serde(rename = "lessThan1ct")]
    pub less_than_1ct: Margin,
    #[serde(rename = "greaterThan1ct")]
    pub greater_than_1ct: Margin,
    pub base_fees: BaseFees,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakingRate {
    pub rate_per_gram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MakingCharges {
    #[serde(rename = "lessThan2g")]
    pub less_than_2g: MakingRate,
    #[serde(rename = "greaterThan2g")]
    pub greater_than_2g: MakingRate,
    pub multiplier: f64,
}

/// The live pricing schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub diamond_margins: DiamondMargins,
    pub making_charges: MakingCharges,
    pub gst_rate: f64,
    pub last_updated: DateTime<Utc>,
    pub updated_by: String,
}

/// Named default schedules.
///
/// Two defaults with different sub-carat multipliers have been in use; the
/// deployment picks one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarginPreset {
    /// Sub-carat multiplier 2.2
    Standard,
    /// Sub-carat multiplier 5
    HighMargin,
}

impl MarginPreset {
    fn less_than_1ct_multiplier(self) -> f64 {
        match self {
            MarginPreset::Standard => 2.2,
            MarginPreset::HighMargin => 5.0,
        }
    }

    /// Default schedule for this preset, stamped at `now` by "system"
    pub fn config(self, now: DateTime<Utc>) -> PricingConfig {
        PricingConfig {
            diamond_margins: DiamondMargins {
                less_than_1ct: Margin {
                    multiplier: self.less_than_1ct_multiplier(),
                    flat_addition: 900.0,
                },
                greater_than_1ct: Margin {
                    multiplier: 2.7,
                    flat_addition: 0.0,
                },
                base_fees: BaseFees {
                    fee1: 150.0,
                    fee2: 700.0,
                },
            },
            making_charges: MakingCharges {
                less_than_2g: MakingRate { rate_per_gram: 950.0 },
                greater_than_2g: MakingRate { rate_per_gram: 700.0 },
                multiplier: 1.75,
            },
            gst_rate: 0.03,
            last_updated: now,
            updated_by: "system".to_string(),
        }
    }
}

impl FromStr for MarginPreset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(MarginPreset::Standard),
            "high-margin" | "high_margin" => Ok(MarginPreset::HighMargin),
            other => Err(AppError::Config(format!(
                "Unknown pricing preset '{}', expected 'standard' or 'high-margin'",
                other
            ))),
        }
    }
}

impl fmt::Display for MarginPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginPreset::Standard => write!(f, "standard"),
            MarginPreset::HighMargin => write!(f, "high-margin"),
        }
    }
}

/// Admin-submitted replacement schedule.
///
/// Sections are optional here so a missing one is reported as a validation
/// failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub diamond_margins: Option<DiamondMargins>,
    pub making_charges: Option<MakingCharges>,
    pub gst_rate: Option<f64>,
}

impl ConfigUpdate {
    /// Merge onto `current`, producing the schedule to persist.
    ///
    /// `diamondMargins` and `makingCharges` are required; an absent
    /// `gstRate` keeps the current rate.
    pub fn apply(
        self,
        current: &PricingConfig,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<PricingConfig> {
        let (diamond_margins, making_charges) = match (self.diamond_margins, self.making_charges) {
            (Some(d), Some(m)) => (d, m),
            _ => {
                return Err(AppError::Validation(
                    "Invalid configuration structure: diamondMargins and makingCharges are required"
                        .to_string(),
                ))
            }
        };

        let config = PricingConfig {
            diamond_margins,
            making_charges,
            gst_rate: self.gst_rate.unwrap_or(current.gst_rate),
            last_updated: now,
            updated_by: updated_by.to_string(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl PricingConfig {
    /// Every schedule value must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        let d = &self.diamond_margins;
        let m = &self.making_charges;
        let fields = [
            ("diamondMargins.lessThan1ct.multiplier", d.less_than_1ct.multiplier),
            ("diamondMargins.lessThan1ct.flatAddition", d.less_than_1ct.flat_addition),
            ("diamondMargins.greaterThan1ct.multiplier", d.greater_than_1ct.multiplier),
            ("diamondMargins.greaterThan1ct.flatAddition", d.greater_than_1ct.flat_addition),
            ("diamondMargins.baseFees.fee1", d.base_fees.fee1),
            ("diamondMargins.baseFees.fee2", d.base_fees.fee2),
            ("makingCharges.lessThan2g.ratePerGram", m.less_than_2g.rate_per_gram),
            ("makingCharges.greaterThan2g.ratePerGram", m.greater_than_2g.rate_per_gram),
            ("makingCharges.multiplier", m.multiplier),
            ("gstRate", self.gst_rate),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_presets_differ_only_in_sub_carat_multiplier() {
        let standard = MarginPreset::Standard.config(now());
        let high = MarginPreset::HighMargin.config(now());
        assert_eq!(standard.diamond_margins.less_than_1ct.multiplier, 2.2);
        assert_eq!(high.diamond_margins.less_than_1ct.multiplier, 5.0);

        let mut normalized = high.clone();
        normalized.diamond_margins.less_than_1ct.multiplier = 2.2;
        assert_eq!(normalized, standard);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("standard".parse::<MarginPreset>().unwrap(), MarginPreset::Standard);
        assert_eq!(" High-Margin ".parse::<MarginPreset>().unwrap(), MarginPreset::HighMargin);
        assert!("".parse::<MarginPreset>().is_err());
        assert!("premium".parse::<MarginPreset>().is_err());
    }

    #[test]
    fn test_json_uses_admin_field_names() {
        let json = serde_json::to_value(MarginPreset::Standard.config(now())).unwrap();
        assert_eq!(json["diamondMargins"]["lessThan1ct"]["flatAddition"], 900.0);
        assert_eq!(json["diamondMargins"]["greaterThan1ct"]["multiplier"], 2.7);
        assert_eq!(json["diamondMargins"]["baseFees"]["fee2"], 700.0);
        assert_eq!(json["makingCharges"]["lessThan2g"]["ratePerGram"], 950.0);
        assert_eq!(json["makingCharges"]["greaterThan2g"]["ratePerGram"], 700.0);
        assert_eq!(json["gstRate"], 0.03);
        assert_eq!(json["updatedBy"], "system");
    }

    #[test]
    fn test_update_requires_sections() {
        let current = MarginPreset::Standard.config(now());
        let update: ConfigUpdate = serde_json::from_value(serde_json::json!({
            "makingCharges": {
                "lessThan2g": { "ratePerGram": 1000 },
                "greaterThan2g": { "ratePerGram": 800 },
                "multiplier": 1.5
            }
        }))
        .unwrap();

        let err = update.apply(&current, "admin", now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_update_keeps_gst_when_absent() {
        let current = MarginPreset::Standard.config(now());
        let update = ConfigUpdate {
            diamond_margins: Some(current.diamond_margins),
            making_charges: Some(current.making_charges),
            gst_rate: None,
        };
        let later = now() + chrono::Duration::hours(1);
        let applied = update.apply(&current, "ops", later).unwrap();
        assert_eq!(applied.gst_rate, 0.03);
        assert_eq!(applied.updated_by, "ops");
        assert_eq!(applied.last_updated, later);
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut config = MarginPreset::Standard.config(now());
        config.diamond_margins.base_fees.fee1 = -1.0;
        assert!(config.validate().is_err());

        let mut config = MarginPreset::Standard.config(now());
        config.gst_rate = f64::NAN;
        assert!(config.validate().is_err());
    }
}
