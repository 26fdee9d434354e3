//! Diamond rate tables
//!
//! Per-carat rates keyed by shape class and weight bracket. Brackets are
//! inclusive on both ends and deliberately leave gaps (0.0095ct, 0.095ct,
//! 0.995ct, anything from 6ct up); a weight in a gap has no rate.

/// One breakpoint bracket: `(min_ct, max_ct, rate_per_ct)`
pub type RateRange = (f64, f64, f64);

/// Round brilliants under one carat
pub const ROUND_UNDER_1CT: &[RateRange] = &[
    (0.001, 0.005, 13500.0),
    (0.006, 0.009, 11600.0),
    (0.01, 0.02, 6900.0),
    (0.025, 0.035, 4600.0),
    (0.04, 0.07, 4600.0),
    (0.08, 0.09, 4600.0),
    (0.1, 0.12, 5100.0),
    (0.13, 0.17, 5100.0),
    (0.18, 0.22, 6200.0),
    (0.23, 0.29, 7000.0),
    (0.3, 0.39, 6750.0),
    (0.4, 0.49, 6750.0),
    (0.5, 0.69, 7100.0),
    (0.7, 0.89, 7100.0),
    (0.9, 0.99, 7300.0),
];

/// Round brilliants of one carat and above
pub const ROUND_1CT_AND_UP: &[RateRange] = &[
    (1.0, 1.99, 11000.0),
    (2.0, 2.99, 12500.0),
    (3.0, 3.99, 13750.0),
    (4.0, 4.99, 14550.0),
    (5.0, 5.99, 15500.0),
];

/// Fancy shapes under one carat
pub const FANCY_UNDER_1CT: &[RateRange] = &[(0.001, 0.99, 7800.0)];

/// Fancy shapes of one carat and above
pub const FANCY_1CT_AND_UP: &[RateRange] = &[
    (1.0, 1.99, 11500.0),
    (2.0, 2.99, 13500.0),
    (3.0, 3.99, 14550.0),
    (4.0, 4.99, 15550.0),
    (5.0, 5.99, 16500.0),
];

const ROUND_ALIASES: [&str; 3] = ["round", "rnd", "r"];

/// Shape class selecting the rate table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    Round,
    Fancy,
}

impl ShapeClass {
    /// Classify a free-text shape label. Case and surrounding whitespace are ignored.
    pub fn classify(shape: &str) -> Self {
        let normalized = shape.trim().to_lowercase();
        if ROUND_ALIASES.contains(&normalized.as_str()) {
            ShapeClass::Round
        } else {
            ShapeClass::Fancy
        }
    }

    /// Table for this class and weight regime (under / at-or-above one carat)
    pub fn table(self, weight: f64) -> &'static [RateRange] {
        match (self, weight < 1.0) {
            (ShapeClass::Round, true) => ROUND_UNDER_1CT,
            (ShapeClass::Round, false) => ROUND_1CT_AND_UP,
            (ShapeClass::Fancy, true) => FANCY_UNDER_1CT,
            (ShapeClass::Fancy, false) => FANCY_1CT_AND_UP,
        }
    }
}

/// Rate of the first bracket containing `weight`, or 0 when none does.
pub fn rate(weight: f64, ranges: &[RateRange]) -> f64 {
    ranges
        .iter()
        .find(|(min, max, _)| weight >= *min && weight <= *max)
        .map(|(_, _, rate)| *rate)
        .unwrap_or(0.0)
}

/// Per-carat rate for a stone of `shape` weighing `weight` carats
pub fn diamond_rate(shape: &str, weight: f64) -> f64 {
    rate(weight, ShapeClass::classify(shape).table(weight))
}
