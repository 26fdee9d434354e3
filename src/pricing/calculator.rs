//! Price calculator
//!
//! Pure function from diamond lines, gold weight and purity, the pricing
//! schedule and the 24K spot price to a rounded price breakdown.

use crate::pricing::config::{Margin, PricingConfig};
use crate::pricing::karat::Karat;
use crate::pricing::product::DiamondLine;
use crate::pricing::rates;
use serde::{Deserialize, Serialize};

/// Rounded price components in whole rupees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub diamond_price: i64,
    pub gold_price: i64,
    pub making_charge: i64,
    pub subtotal: i64,
    pub gst: i64,
    pub total: i64,
}

/// Round half up, matching the storefront's displayed figures
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn margin_for(weight: f64, config: &PricingConfig) -> &Margin {
    if weight >= 1.0 {
        &config.diamond_margins.greater_than_1ct
    } else {
        &config.diamond_margins.less_than_1ct
    }
}

/// Marked-up cost of one diamond line; 0 for non-priceable lines
pub fn diamond_line_price(line: &DiamondLine, config: &PricingConfig) -> f64 {
    if !line.is_priceable() {
        return 0.0;
    }
    let weight = line.weight_per_stone;
    let rate = rates::diamond_rate(&line.shape, weight);
    let base = weight * line.count as f64 * rate;
    let margin = margin_for(weight, config);
    base * margin.multiplier + margin.flat_addition
}

/// Marked-up diamond total including the per-product base fees
pub fn diamond_total(diamonds: &[DiamondLine], config: &PricingConfig) -> f64 {
    let lines: f64 = diamonds
        .iter()
        .map(|line| diamond_line_price(line, config))
        .sum();
    lines + config.diamond_margins.base_fees.total()
}

pub fn making_charge(gold_weight: f64, config: &PricingConfig) -> f64 {
    let making = &config.making_charges;
    let rate = if gold_weight >= 2.0 {
        making.greater_than_2g.rate_per_gram
    } else {
        making.less_than_2g.rate_per_gram
    };
    gold_weight * rate * making.multiplier
}

/// Price a product in one purity.
///
/// An unrecognized purity (`None`) prices the gold at zero; diamonds and
/// making charges are still applied.
pub fn calculate(
    diamonds: &[DiamondLine],
    gold_weight: f64,
    karat: Option<Karat>,
    config: &PricingConfig,
    spot_24k: f64,
) -> PriceBreakdown {
    let diamond = diamond_total(diamonds, config);
    let gold_rate = karat.map(|k| k.gold_rate(spot_24k)).unwrap_or(0.0);
    let gold = gold_rate * gold_weight;
    let making = making_charge(gold_weight, config);

    let subtotal = round_half_up(diamond + gold + making);
    let gst = round_half_up(subtotal as f64 * config.gst_rate);
    let total = round_half_up((subtotal + gst) as f64);

    PriceBreakdown {
        diamond_price: round_half_up(diamond),
        gold_price: round_half_up(gold),
        making_charge: round_half_up(making),
        subtotal,
        gst,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::config::MarginPreset;
    use chrono::{TimeZone, Utc};

    fn standard() -> PricingConfig {
        MarginPreset::Standard.config(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_worked_example_standard_preset() {
        let diamonds = vec![DiamondLine::new("round", 0.5, 2)];
        let price = calculate(&diamonds, 5.0, Some(Karat::K18), &standard(), 7000.0);

        // 0.5 * 2 * 7100 = 7100; 7100 * 2.2 + 900 = 16520; + 150 + 700
        assert_eq!(price.diamond_price, 17370);
        assert_eq!(price.gold_price, 26250);
        // 5g >= 2g: 5 * 700 * 1.75
        assert_eq!(price.making_charge, 6125);
        assert_eq!(price.subtotal, 49745);
        assert_eq!(price.gst, 1492);
        assert_eq!(price.total, 51237);
    }

    #[test]
    fn test_worked_example_high_margin_preset() {
        let config = MarginPreset::HighMargin.config(Utc::now());
        let diamonds = vec![DiamondLine::new("round", 0.5, 2)];
        let price = calculate(&diamonds, 5.0, Some(Karat::K18), &config, 7000.0);
        assert_eq!(price.diamond_price, 37250);
        assert_eq!(price.subtotal, 69625);
        assert_eq!(price.gst, 2089);
        assert_eq!(price.total, 71714);
    }

    #[test]
    fn test_non_positive_lines_contribute_nothing() {
        let config = standard();
        for line in [
            DiamondLine::new("round", 0.0, 4),
            DiamondLine::new("round", -0.5, 4),
            DiamondLine::new("round", 0.5, 0),
            DiamondLine::new("oval", 0.5, -2),
            DiamondLine::new("oval", f64::NAN, 2),
        ] {
            assert_eq!(diamond_line_price(&line, &config), 0.0, "{:?}", line);
        }

        let fees_only = calculate(&[DiamondLine::new("round", 0.0, 3)], 0.0, Some(Karat::K14), &config, 7000.0);
        assert_eq!(fees_only.diamond_price, 850);
    }

    #[test]
    fn test_margin_boundary_at_one_carat() {
        let config = standard();
        let at_one = DiamondLine::new("round", 1.0, 1);
        assert_eq!(diamond_line_price(&at_one, &config), 11000.0 * 2.7);

        // Just under one carat falls in the sub-carat gap: rate 0, flat addition only
        let just_under = DiamondLine::new("round", 0.999999, 1);
        assert_eq!(diamond_line_price(&just_under, &config), 900.0);
    }

    #[test]
    fn test_out_of_table_weight_still_gets_flat_addition() {
        let config = standard();
        let huge = DiamondLine::new("round", 6.5, 1);
        assert_eq!(diamond_line_price(&huge, &config), 0.0);
        let gap = DiamondLine::new("round", 0.095, 10);
        assert_eq!(diamond_line_price(&gap, &config), 900.0);
    }

    #[test]
    fn test_making_charge_boundary_at_two_grams() {
        let config = standard();
        assert_eq!(making_charge(2.0, &config), 2.0 * 700.0 * 1.75);
        assert_eq!(making_charge(1.999, &config), 1.999 * 950.0 * 1.75);
    }

    #[test]
    fn test_unknown_karat_prices_gold_at_zero() {
        let price = calculate(&[], 3.0, None, &standard(), 7000.0);
        assert_eq!(price.gold_price, 0);
        assert_eq!(price.making_charge, round_half_up(3.0 * 700.0 * 1.75));
    }

    #[test]
    fn test_total_is_rounded_subtotal_plus_gst() {
        let config = standard();
        let diamonds = vec![
            DiamondLine::new("r", 0.012, 14),
            DiamondLine::new("pear", 0.3, 1),
            DiamondLine::new("RND", 1.25, 1),
        ];
        for karat in Karat::ALL {
            let price = calculate(&diamonds, 3.37, Some(karat), &config, 7123.45);
            assert_eq!(price.gst, round_half_up(price.subtotal as f64 * 0.03));
            assert_eq!(price.total, price.subtotal + price.gst);
            let components = price.diamond_price + price.gold_price + price.making_charge;
            assert!((components - price.subtotal).abs() <= 2);
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(1492.35), 1492);
        assert_eq!(round_half_up(2088.75), 2089);
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(-0.5), 0);
    }
}
