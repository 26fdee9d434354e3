//! Application state management

use crate::clock::{Clock, SystemClock};
use crate::db::SqliteDb;
use crate::error::Result;
use crate::providers::quote_source::{self, GoldQuoteSource};
use crate::providers::{ConfigProvider, GoldPriceProvider};
use crate::security::AdminGate;
use crate::services::PricingService;
use crate::settings::Settings;
use std::sync::Arc;
use tracing::info;

/// Shared state for the API server and CLI commands
pub struct AppState {
    pub settings: Settings,

    /// SQLite database connection
    pub sqlite: Arc<SqliteDb>,

    pub clock: Arc<dyn Clock>,

    /// Pricing schedule cache
    pub config: Arc<ConfigProvider>,

    /// Gold spot price cache
    pub gold: Arc<GoldPriceProvider>,

    /// Memoized product quotes
    pub pricing: PricingService,
}

impl AppState {
    /// Open the database and build providers from settings
    pub fn new(settings: Settings) -> Result<Self> {
        let sqlite = Arc::new(SqliteDb::new(&settings.database_path)?);
        info!(path = %settings.database_path.display(), "Opened pricing database");

        let source = quote_source::build_source(
            settings.gold_quote_format,
            &settings.gold_quote_url,
            settings.http_timeout,
        )?;

        Ok(Self::with_parts(settings, sqlite, source, Arc::new(SystemClock)))
    }

    /// Assemble state from already-built collaborators
    pub fn with_parts(
        settings: Settings,
        sqlite: Arc<SqliteDb>,
        source: Arc<dyn GoldQuoteSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gate = AdminGate::new(settings.admin_password.as_deref());

        let config = Arc::new(ConfigProvider::new(
            sqlite.clone(),
            settings.pricing_preset,
            gate,
            clock.clone(),
            settings.config_cache_ttl,
        ));

        let gold = Arc::new(GoldPriceProvider::new(
            source,
            clock.clone(),
            settings.gold_refresh_hour,
            settings.gold_fallback_price,
        ));

        let pricing = PricingService::new(config.clone(), gold.clone());

        Self {
            settings,
            sqlite,
            clock,
            config,
            gold,
            pricing,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::clock::ManualClock;
    use crate::providers::FixedQuoteSource;
    use chrono::{TimeZone, Utc};

    /// In-memory state with admin password "pw" and a fixed 7000 spot price
    pub fn test_state() -> AppState {
        let settings = Settings::from_lookup(|key| match key {
            "PRICING_PRESET" => Some("standard".to_string()),
            "ADMIN_PASSWORD" => Some("pw".to_string()),
            _ => None,
        })
        .unwrap();
        let sqlite = Arc::new(SqliteDb::open_in_memory().unwrap());
        let source = Arc::new(FixedQuoteSource::new(7000.0).unwrap());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 4, 1, 5, 0, 0).unwrap(),
        ));
        AppState::with_parts(settings, sqlite, source, clock)
    }
}
