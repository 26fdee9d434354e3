//! REST API for pricing
//!
//! Provides:
//! - Pricing schedule read, admin update and reset (/api/pricing-config)
//! - Gold spot price with per-karat rates (/api/gold-price)
//! - Product quotes from a description (/api/price)

pub mod handlers;
mod server;
mod types;

pub use server::{router, ApiServer};
pub use types::{
    ConfigResponse, GoldPriceResponse, HealthResponse, PriceRequest, PriceResponse,
    ResetConfigRequest, UpdateConfigRequest,
};
