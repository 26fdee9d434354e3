//! Runtime settings read from the environment

use crate::error::{AppError, Result};
use crate::pricing::MarginPreset;
use crate::providers::QuoteFormat;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATABASE_PATH: &str = "data/jewel-pricing.db";
const DEFAULT_GOLD_QUOTE_URL: &str = "https://groww.in/gold-rates/gold-rate-today-in-surat";

#[derive(Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    /// Shared secret for config writes; `None` disables them
    pub admin_password: Option<String>,
    pub pricing_preset: MarginPreset,
    pub gold_quote_url: String,
    pub gold_quote_format: QuoteFormat,
    /// City the quote page covers, echoed by the gold price API
    pub gold_city: String,
    pub gold_fallback_price: f64,
    /// IST hour after which a new day's quote is fetched
    pub gold_refresh_hour: u32,
    pub config_cache_ttl: Duration,
    pub http_timeout: Duration,
    pub server_host: String,
    pub server_port: u16,
}

impl Settings {
    /// Load from process environment (after `.env`, if present)
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let pricing_preset = get("PRICING_PRESET")
            .ok_or_else(|| {
                AppError::Config(
                    "PRICING_PRESET is required ('standard' or 'high-margin')".to_string(),
                )
            })?
            .parse::<MarginPreset>()?;

        let gold_fallback_price: f64 = parse_or(&get, "GOLD_FALLBACK_PRICE", 6500.0)?;
        if !gold_fallback_price.is_finite() || gold_fallback_price <= 0.0 {
            return Err(AppError::Config(
                "GOLD_FALLBACK_PRICE must be a positive number".to_string(),
            ));
        }

        let gold_refresh_hour: u32 = parse_or(&get, "GOLD_REFRESH_HOUR", 8)?;
        if gold_refresh_hour > 23 {
            return Err(AppError::Config(
                "GOLD_REFRESH_HOUR must be between 0 and 23".to_string(),
            ));
        }

        Ok(Self {
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            admin_password: get("ADMIN_PASSWORD"),
            pricing_preset,
            gold_quote_url: get("GOLD_QUOTE_URL").unwrap_or_else(|| DEFAULT_GOLD_QUOTE_URL.to_string()),
            gold_quote_format: get("GOLD_QUOTE_FORMAT")
                .map(|v| v.parse::<QuoteFormat>())
                .transpose()?
                .unwrap_or(QuoteFormat::Html),
            gold_city: get("GOLD_CITY").unwrap_or_else(|| "Surat".to_string()),
            gold_fallback_price,
            gold_refresh_hour,
            config_cache_ttl: Duration::from_secs(parse_or(&get, "CONFIG_CACHE_SECS", 300)?),
            http_timeout: Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 10)?),
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&get, "SERVER_PORT", 3000)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", key, raw, e))),
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database_path", &self.database_path)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("pricing_preset", &self.pricing_preset)
            .field("gold_quote_url", &self.gold_quote_url)
            .field("gold_quote_format", &self.gold_quote_format)
            .field("gold_city", &self.gold_city)
            .field("gold_fallback_price", &self.gold_fallback_price)
            .field("gold_refresh_hour", &self.gold_refresh_hour)
            .field("config_cache_ttl", &self.config_cache_ttl)
            .field("http_timeout", &self.http_timeout)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[("PRICING_PRESET", "standard")]).unwrap();
        assert_eq!(s.pricing_preset, MarginPreset::Standard);
        assert_eq!(s.database_path, PathBuf::from("data/jewel-pricing.db"));
        assert_eq!(s.admin_password, None);
        assert_eq!(s.gold_quote_format, QuoteFormat::Html);
        assert_eq!(s.gold_fallback_price, 6500.0);
        assert_eq!(s.gold_refresh_hour, 8);
        assert_eq!(s.config_cache_ttl, Duration::from_secs(300));
        assert_eq!(s.http_timeout, Duration::from_secs(10));
        assert_eq!(s.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_preset_is_required() {
        assert!(matches!(settings(&[]), Err(AppError::Config(_))));
        assert!(matches!(
            settings(&[("PRICING_PRESET", "cheap")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_overrides_and_validation() {
        let s = settings(&[
            ("PRICING_PRESET", "high-margin"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("GOLD_QUOTE_FORMAT", "json"),
            ("GOLD_REFRESH_HOUR", "9"),
            ("SERVER_PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(s.pricing_preset, MarginPreset::HighMargin);
        assert_eq!(s.gold_quote_format, QuoteFormat::Json);
        assert_eq!(s.gold_refresh_hour, 9);
        assert_eq!(s.server_port, 8080);
        assert!(!format!("{:?}", s).contains("hunter2"));

        assert!(settings(&[("PRICING_PRESET", "standard"), ("GOLD_REFRESH_HOUR", "24")]).is_err());
        assert!(settings(&[("PRICING_PRESET", "standard"), ("SERVER_PORT", "http")]).is_err());
        assert!(settings(&[("PRICING_PRESET", "standard"), ("GOLD_FALLBACK_PRICE", "-1")]).is_err());
    }
}
