//! Gold quote sources
//!
//! A source returns the 24K spot price in INR per gram. Anything outside
//! the plausible per-gram band is treated as a parse miss, not a price.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Exclusive bounds for a believable 24K per-gram quote
const MIN_PLAUSIBLE: f64 = 5000.0;
const MAX_PLAUSIBLE: f64 = 20000.0;

pub fn is_plausible(price: f64) -> bool {
    price > MIN_PLAUSIBLE && price < MAX_PLAUSIBLE
}

/// Upstream that quotes the 24K spot price
#[async_trait]
pub trait GoldQuoteSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the current 24K price per gram
    async fn fetch_spot_price(&self) -> Result<f64>;
}

/// Wire format of the configured quote URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteFormat {
    Html,
    Json,
}

impl FromStr for QuoteFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(QuoteFormat::Html),
            "json" => Ok(QuoteFormat::Json),
            other => Err(AppError::Config(format!(
                "Unknown gold quote format '{}', expected 'html' or 'json'",
                other
            ))),
        }
    }
}

impl fmt::Display for QuoteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteFormat::Html => write!(f, "html"),
            QuoteFormat::Json => write!(f, "json"),
        }
    }
}

/// Build the source for a configured URL and format
pub fn build_source(
    format: QuoteFormat,
    url: &str,
    timeout: Duration,
) -> Result<Arc<dyn GoldQuoteSource>> {
    let source: Arc<dyn GoldQuoteSource> = match format {
        QuoteFormat::Html => Arc::new(HtmlQuoteSource::new(url, timeout)?),
        QuoteFormat::Json => Arc::new(JsonQuoteSource::new(url, timeout)?),
    };
    Ok(source)
}

fn http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

async fn get_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::GoldPrice(format!(
            "Quote page returned HTTP {}",
            status
        )));
    }
    Ok(response.text().await?)
}

// ========== HTML page ==========

/// Scrapes a public gold-rate page
pub struct HtmlQuoteSource {
    client: Client,
    url: String,
}

impl HtmlQuoteSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl GoldQuoteSource for HtmlQuoteSource {
    fn name(&self) -> &str {
        "html"
    }

    async fn fetch_spot_price(&self) -> Result<f64> {
        debug!(url = %self.url, "Fetching gold quote page");
        let html = get_text(&self.client, &self.url).await?;
        parse_html_price(&html)
    }
}

/// `₹ 1,234.56` anywhere in the page text
static RUPEE_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"₹\s?([\d,]+\.?\d*)").expect("valid rupee amount pattern"));

/// First amount inside a price element, rupee sign optional
static LOOSE_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"₹?\s?([\d,]+\.?\d*)").expect("valid amount pattern"));

static BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").expect("valid body pattern"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

static SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<span\b([^>]*)>(.*?)</span\s*>").expect("valid span pattern")
});

static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid class attribute pattern")
});

/// Pick the 24K price out of a rate page.
///
/// Rupee amounts in the body text are tried first, in document order.
/// Inline script bodies count as text, so prices that only appear in
/// embedded page state are still found. `span.bodyLargeHeavy` elements are
/// the second chance.
pub fn parse_html_price(html: &str) -> Result<f64> {
    let body = BODY
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map_or(html, |m| m.as_str());
    let text = text_content(body);

    let found = RUPEE_AMOUNT
        .captures_iter(&text)
        .filter_map(|caps| parse_amount(&caps[1]))
        .find(|p| is_plausible(*p));
    if let Some(price) = found {
        return Ok(price);
    }

    for span in SPAN.captures_iter(html) {
        if !has_class(&span[1], "bodyLargeHeavy") {
            continue;
        }
        let text = text_content(&span[2]);
        let price = LOOSE_AMOUNT
            .captures(&text)
            .and_then(|caps| parse_amount(&caps[1]))
            .filter(|p| is_plausible(*p));
        if let Some(price) = price {
            return Ok(price);
        }
    }

    Err(AppError::GoldPrice(
        "Could not locate a valid 24K price on the quote page".to_string(),
    ))
}

/// Concatenated text nodes, like a DOM `textContent`
fn text_content(html: &str) -> String {
    decode_entities(&TAG.replace_all(html, ""))
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#8377;", "₹")
        .replace("&#x20b9;", "₹")
        .replace("&#x20B9;", "₹")
        .replace("&amp;", "&")
}

/// `7,582.50` -> 7582.5; thousands separators are dropped
fn parse_amount(digits: &str) -> Option<f64> {
    digits
        .replace(',', "")
        .trim_end_matches('.')
        .parse()
        .ok()
}

fn has_class(attrs: &str, class_name: &str) -> bool {
    CLASS_ATTR.captures(attrs).map_or(false, |caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .any(|value| value.as_str().split_whitespace().any(|c| c == class_name))
    })
}

// ========== Fixed price ==========

/// Always quotes the same price; used for offline runs with `--spot`
pub struct FixedQuoteSource {
    price: f64,
}

impl FixedQuoteSource {
    pub fn new(price: f64) -> Result<Self> {
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::Validation(format!(
                "Spot price must be a positive number, got {}",
                price
            )));
        }
        Ok(Self { price })
    }
}

#[async_trait]
impl GoldQuoteSource for FixedQuoteSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_spot_price(&self) -> Result<f64> {
        Ok(self.price)
    }
}

// ========== JSON endpoint ==========

/// Reads `{ "price": <number|string> }` from a JSON endpoint
pub struct JsonQuoteSource {
    client: Client,
    url: String,
}

impl JsonQuoteSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl GoldQuoteSource for JsonQuoteSource {
    fn name(&self) -> &str {
        "json"
    }

    async fn fetch_spot_price(&self) -> Result<f64> {
        debug!(url = %self.url, "Fetching gold quote JSON");
        let body = get_text(&self.client, &self.url).await?;
        let value: Value = serde_json::from_str(&body)?;
        parse_json_price(&value)
    }
}

pub fn parse_json_price(value: &Value) -> Result<f64> {
    let price = match value.get("price") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            LOOSE_AMOUNT
                .captures(s)
                .and_then(|caps| parse_amount(&caps[1]))
        }
        _ => None,
    };

    match price {
        Some(p) if is_plausible(p) => Ok(p),
        Some(p) => Err(AppError::GoldPrice(format!(
            "Quoted price {} is outside the plausible range",
            p
        ))),
        None => Err(AppError::GoldPrice(
            "Quote response has no usable 'price' field".to_string(),
        )),
    }
}
