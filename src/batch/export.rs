//! CSV export of priced products

use crate::batch::orchestrator::ProductPriceResult;
use crate::pricing::{Karat, PriceBreakdown};
use chrono::{DateTime, Utc};

pub const HEADERS: [&str; 19] = [
    "Handle",
    "Title",
    "10K Weight (g)",
    "14K Weight (g)",
    "18K Weight (g)",
    "Diamond Shapes",
    "Total Diamonds",
    "Diamond Weight (each)",
    "Total Diamond Weight",
    "Size",
    "Dimensions",
    "10K Price",
    "14K Price",
    "18K Price",
    "Diamond Price",
    "Gold Price (14K)",
    "Making Charge",
    "GST",
    "Total Price (14K)",
];

/// Quote a text field, doubling inner quotes; empty text stays empty
pub fn escape_csv(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn breakdown(result: &ProductPriceResult, karat: Karat) -> Option<&PriceBreakdown> {
    result.prices.get(&karat).and_then(Option::as_ref)
}

fn opt(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row(result: &ProductPriceResult) -> String {
    let p14 = breakdown(result, Karat::K14);
    let total = |karat| opt(breakdown(result, karat).map(|b| b.total));

    let fields = [
        escape_csv(&result.handle),
        escape_csv(&result.title),
        result.gold_weights.weight(Karat::K10).to_string(),
        result.gold_weights.weight(Karat::K14).to_string(),
        result.gold_weights.weight(Karat::K18).to_string(),
        escape_csv(&result.diamond_shapes),
        escape_csv(&result.total_diamonds),
        escape_csv(&result.diamond_weight_each),
        escape_csv(&result.total_diamond_weight),
        escape_csv(&result.size),
        escape_csv(&result.dimensions),
        total(Karat::K10),
        total(Karat::K14),
        total(Karat::K18),
        opt(p14.map(|b| b.diamond_price)),
        opt(p14.map(|b| b.gold_price)),
        opt(p14.map(|b| b.making_charge)),
        opt(p14.map(|b| b.gst)),
        opt(p14.map(|b| b.total)),
    ];
    fields.join(",")
}

/// Header plus one row per product, joined by "\n" with no trailing newline
pub fn to_csv(results: &[ProductPriceResult]) -> String {
    std::iter::once(HEADERS.join(","))
        .chain(results.iter().map(row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `product-prices-<unix millis>.csv`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("product-prices-{}.csv", now.timestamp_millis())
}
