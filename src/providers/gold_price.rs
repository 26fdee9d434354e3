//! Gold Spot Price Provider
//!
//! Holds the last good 24K quote and refreshes it at most once per IST
//! calendar day, at or after the cutoff hour. Readers never see an error:
//! a failed fetch serves the stale quote, or the configured fallback when
//! nothing has been fetched yet.

use crate::clock::Clock;
use crate::error::Result;
use crate::pricing::Karat;
use crate::providers::quote_source::GoldQuoteSource;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Asia::Kolkata;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Where a served quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotSource {
    /// Fetched during this call
    Live,
    /// Served from the provider cache
    Cached,
    /// Configured fallback, no quote has been fetched
    Fallback,
}

/// A 24K quote in INR per gram
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldSpot {
    pub price_24k: f64,
    /// IST date of the successful fetch
    pub fetched_on: Option<NaiveDate>,
    pub source: SpotSource,
}

#[derive(Debug, Clone, Copy)]
struct SpotState {
    price: f64,
    fetched_on: NaiveDate,
}

impl SpotState {
    fn spot(&self, source: SpotSource) -> GoldSpot {
        GoldSpot {
            price_24k: self.price,
            fetched_on: Some(self.fetched_on),
            source,
        }
    }
}

pub struct GoldPriceProvider {
    source: Arc<dyn GoldQuoteSource>,
    clock: Arc<dyn Clock>,
    cutoff_hour: u32,
    fallback_price: f64,
    state: RwLock<Option<SpotState>>,
    /// Serializes upstream fetches
    refresh_gate: tokio::sync::Mutex<()>,
}

impl GoldPriceProvider {
    pub fn new(
        source: Arc<dyn GoldQuoteSource>,
        clock: Arc<dyn Clock>,
        cutoff_hour: u32,
        fallback_price: f64,
    ) -> Self {
        Self {
            source,
            clock,
            cutoff_hour,
            fallback_price,
            state: RwLock::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn cutoff_hour(&self) -> u32 {
        self.cutoff_hour
    }

    /// Cached quote without touching the upstream
    pub fn current(&self) -> Option<GoldSpot> {
        let state = *self.state.read();
        state.map(|s| s.spot(SpotSource::Cached))
    }

    /// Next instant at which a daily refresh is due
    pub fn next_update(&self) -> DateTime<Utc> {
        next_cutoff(self.clock.now(), self.cutoff_hour)
    }

    fn should_fetch(&self, now: DateTime<Utc>) -> bool {
        match *self.state.read() {
            None => true,
            Some(state) => {
                let ist = now.with_timezone(&Kolkata);
                ist.date_naive() > state.fetched_on && ist.hour() >= self.cutoff_hour
            }
        }
    }

    fn stale_or_fallback(&self) -> GoldSpot {
        self.current().unwrap_or(GoldSpot {
            price_24k: self.fallback_price,
            fetched_on: None,
            source: SpotSource::Fallback,
        })
    }

    /// Current spot price; never fails.
    pub async fn get_gold_price(&self) -> GoldSpot {
        if !self.should_fetch(self.clock.now()) {
            return self.stale_or_fallback();
        }

        let _guard = match self.refresh_gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                // A refresh is in flight; serve what we have if anything.
                if let Some(spot) = self.current() {
                    return spot;
                }
                self.refresh_gate.lock().await
            }
        };

        if !self.should_fetch(self.clock.now()) {
            return self.stale_or_fallback();
        }

        match self.fetch().await {
            Ok(state) => state.spot(SpotSource::Live),
            Err(e) => {
                let spot = self.stale_or_fallback();
                warn!(
                    error = %e,
                    source = self.source.name(),
                    fallback = ?spot.source,
                    price = spot.price_24k,
                    "Gold price fetch failed"
                );
                spot
            }
        }
    }

    /// Fetch regardless of freshness. On failure the cache is left as is
    /// and the error is returned.
    pub async fn force_refresh(&self) -> Result<GoldSpot> {
        let _guard = self.refresh_gate.lock().await;
        match self.fetch().await {
            Ok(state) => Ok(state.spot(SpotSource::Live)),
            Err(e) => {
                warn!(error = %e, source = self.source.name(), "Forced gold price refresh failed");
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<SpotState> {
        let price = self.source.fetch_spot_price().await?;
        let state = SpotState {
            price,
            fetched_on: self.clock.now().with_timezone(&Kolkata).date_naive(),
        };
        *self.state.write() = Some(state);

        info!(
            price,
            fetched_on = %state.fetched_on,
            source = self.source.name(),
            "Gold price updated"
        );
        Ok(state)
    }
}

/// Per-gram rate for every karat, to two decimals
pub fn karat_rates(spot_24k: f64) -> BTreeMap<Karat, f64> {
    Karat::ALL
        .iter()
        .map(|k| (*k, (k.gold_rate(spot_24k) * 100.0).round() / 100.0))
        .collect()
}

/// First `hour:00` IST strictly after `now`
pub fn next_cutoff(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let ist = now.with_timezone(&Kolkata);
    let today = ist
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .and_then(|t| Kolkata.from_local_datetime(&t).single());

    match today {
        Some(target) if target > ist => target.with_timezone(&Utc),
        Some(target) => (target + Duration::days(1)).with_timezone(&Utc),
        None => now + Duration::days(1),
    }
}
