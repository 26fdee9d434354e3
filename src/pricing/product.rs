//! Structured product attributes built from an extracted spec map

use crate::pricing::extractor::{self, SpecMap};
use crate::pricing::karat::Karat;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One group of same-shape, same-weight stones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiamondLine {
    /// Lowercased shape label
    pub shape: String,
    pub weight_per_stone: f64,
    pub count: i64,
}

impl DiamondLine {
    pub fn new(shape: &str, weight_per_stone: f64, count: i64) -> Self {
        Self {
            shape: shape.trim().to_lowercase(),
            weight_per_stone,
            count,
        }
    }

    /// Lines with a non-positive (or unparseable) weight or count price at zero
    pub fn is_priceable(&self) -> bool {
        self.weight_per_stone.is_finite() && self.weight_per_stone > 0.0 && self.count > 0
    }
}

/// Gram weight of the piece in each offered purity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoldWeightSet(BTreeMap<Karat, f64>);

impl GoldWeightSet {
    pub fn from_spec(spec: &SpecMap) -> Self {
        let weights = Karat::ALL
            .iter()
            .map(|&karat| {
                let raw = spec.get(gold_label(karat)).map(String::as_str).unwrap_or("");
                (karat, parse_gold_weight(raw))
            })
            .collect();
        Self(weights)
    }

    /// Weight for `karat`, 0 when not offered
    pub fn weight(&self, karat: Karat) -> f64 {
        self.0.get(&karat).copied().unwrap_or(0.0)
    }

    /// Karats with a positive weight, in ascending purity
    pub fn offered(&self) -> impl Iterator<Item = (Karat, f64)> + '_ {
        self.0
            .iter()
            .filter(|(_, grams)| **grams > 0.0)
            .map(|(karat, grams)| (*karat, *grams))
    }
}

pub fn gold_label(karat: Karat) -> &'static str {
    match karat {
        Karat::K10 => extractor::GOLD_10K,
        Karat::K14 => extractor::GOLD_14K,
        Karat::K18 => extractor::GOLD_18K,
    }
}

/// Comma-separated list entries, trimmed, empties dropped
pub fn split_list(value: Option<&String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Index-align the shape, weight and count lists. Shapes drive the zip;
/// missing weights or counts read as zero.
pub fn diamond_lines(spec: &SpecMap) -> Vec<DiamondLine> {
    let shapes = split_list(spec.get(extractor::DIAMOND_SHAPE));
    let weights = split_list(spec.get(extractor::DIAMOND_WEIGHT));
    let counts = split_list(spec.get(extractor::TOTAL_DIAMONDS));

    shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| {
            let weight = weights.get(i).map(|w| parse_decimal(w)).unwrap_or(0.0);
            let count = counts.get(i).map(|c| parse_integer(c)).unwrap_or(0);
            DiamondLine::new(shape, weight, count)
        })
        .collect()
}

/// Grams from text such as "3.2g", "3.2 gm" or "3.2"; 0 when unparseable.
pub fn parse_gold_weight(raw: &str) -> f64 {
    let lowered = raw.trim().to_ascii_lowercase();
    let stripped = lowered
        .strip_suffix("gm")
        .or_else(|| lowered.strip_suffix('g'))
        .unwrap_or(&lowered);
    let grams = parse_decimal(stripped);
    if grams > 0.0 {
        grams
    } else {
        0.0
    }
}

/// Leading decimal, with an optional exponent when digits follow it
static LEADING_DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("valid decimal pattern")
});

static LEADING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid integer pattern"));

/// Leading decimal number of `s` ("0.5ct" -> 0.5), 0 when there is none.
pub fn parse_decimal(s: &str) -> f64 {
    LEADING_DECIMAL
        .captures(s)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}

/// Leading integer of `s` ("4 pcs" -> 4, "4.5" -> 4), 0 when there is none.
pub fn parse_integer(s: &str) -> i64 {
    LEADING_INTEGER
        .captures(s)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::extractor::extract;

    #[test]
    fn test_two_diamond_lines_from_description() {
        let spec = extract(
            "Diamond Shape: round, princess\nDiamond Weight: 0.5, 1.2\nTotal Diamonds: 4, 2",
        );
        let lines = diamond_lines(&spec);
        assert_eq!(
            lines,
            vec![
                DiamondLine::new("round", 0.5, 4),
                DiamondLine::new("princess", 1.2, 2),
            ]
        );
    }

    #[test]
    fn test_shapes_drive_the_zip() {
        let spec = extract("Diamond Shape: Round, Oval, Pear\nDiamond Weight: 0.1\nTotal Diamonds: 3, 5, 7, 9");
        let lines = diamond_lines(&spec);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], DiamondLine::new("round", 0.1, 3));
        assert_eq!(lines[1], DiamondLine::new("oval", 0.0, 5));
        assert!(!lines[1].is_priceable());
        assert_eq!(lines[2].count, 7);
    }

    #[test]
    fn test_no_shapes_means_no_lines() {
        let spec = extract("Diamond Weight: 0.1\nTotal Diamonds: 3");
        assert!(diamond_lines(&spec).is_empty());
    }

    #[test]
    fn test_gold_weights() {
        let spec = extract("10K Gold: 1.8 gm\n14K Gold: 2.1g\n18K Gold: 0g");
        let gold = GoldWeightSet::from_spec(&spec);
        assert_eq!(gold.weight(Karat::K10), 1.8);
        assert_eq!(gold.weight(Karat::K14), 2.1);
        assert_eq!(gold.weight(Karat::K18), 0.0);
        let offered: Vec<_> = gold.offered().map(|(k, _)| k).collect();
        assert_eq!(offered, vec![Karat::K10, Karat::K14]);
    }

    #[test]
    fn test_numeric_prefix_parsing() {
        assert_eq!(parse_decimal("0.5ct"), 0.5);
        assert_eq!(parse_decimal(" .25"), 0.25);
        assert_eq!(parse_decimal("-0.2"), -0.2);
        assert_eq!(parse_decimal("abc"), 0.0);
        assert_eq!(parse_decimal("."), 0.0);
        assert_eq!(parse_decimal("2e-1ct"), 0.2);
        assert_eq!(parse_decimal("3each"), 3.0);
        assert!(parse_decimal("1e400").is_infinite());
        assert_eq!(parse_integer("4 pcs"), 4);
        assert_eq!(parse_integer("4.5"), 4);
        assert_eq!(parse_integer("-3"), -3);
        assert_eq!(parse_integer("x"), 0);
        assert_eq!(parse_decimal("5.g"), 5.0);
        assert_eq!(parse_decimal("\t+0.75 ct"), 0.75);
        assert_eq!(parse_integer(" +7 stones"), 7);
        assert_eq!(parse_integer("99999999999999999999"), 0);
        assert_eq!(parse_gold_weight("2.5 GM"), 2.5);
        assert_eq!(parse_gold_weight(""), 0.0);
        assert_eq!(parse_gold_weight("-1g"), 0.0);
    }
}
