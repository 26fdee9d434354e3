//! Data providers for pricing
//!
//! Both providers own their cache and take an injected `Clock`, so callers
//! share one instance through `Arc` and never manage cache state themselves.

pub mod config_provider;
pub mod gold_price;
pub mod quote_source;

pub use config_provider::{ConfigProvider, ConfigStore};
pub use gold_price::{GoldPriceProvider, GoldSpot, SpotSource};
pub use quote_source::{
    FixedQuoteSource, GoldQuoteSource, HtmlQuoteSource, JsonQuoteSource, QuoteFormat,
};
