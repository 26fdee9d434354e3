//! Pricing Configuration Provider
//!
//! Serves the live schedule from a TTL cache backed by a `ConfigStore`.
//! Admin writes go through the `AdminGate` and drop the cache.

use crate::clock::Clock;
use crate::db::SqliteDb;
use crate::error::Result;
use crate::pricing::{ConfigUpdate, MarginPreset, PricingConfig};
use crate::security::AdminGate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persistence for the single live schedule
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored schedule, `None` when nothing has been written yet
    async fn read(&self) -> Result<Option<PricingConfig>>;

    /// Replace the stored schedule
    async fn write(&self, config: &PricingConfig) -> Result<PricingConfig>;

    /// Insert `default` only if the store is empty; returns the live row
    async fn initialize_default(&self, default: &PricingConfig) -> Result<PricingConfig>;
}

#[async_trait]
impl ConfigStore for SqliteDb {
    async fn read(&self) -> Result<Option<PricingConfig>> {
        self.get_pricing_config()
    }

    async fn write(&self, config: &PricingConfig) -> Result<PricingConfig> {
        self.save_pricing_config(config)
    }

    async fn initialize_default(&self, default: &PricingConfig) -> Result<PricingConfig> {
        self.init_pricing_config(default)
    }
}

struct CachedConfig {
    config: PricingConfig,
    fetched_at: DateTime<Utc>,
}

/// Cached access to the pricing schedule
pub struct ConfigProvider {
    store: Arc<dyn ConfigStore>,
    preset: MarginPreset,
    gate: AdminGate,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    cache: RwLock<Option<CachedConfig>>,
    /// Bumped on every invalidation; a read that started under an older
    /// generation must not repopulate the cache.
    generation: AtomicU64,
}

impl ConfigProvider {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        preset: MarginPreset,
        gate: AdminGate,
        clock: Arc<dyn Clock>,
        ttl: std::time::Duration,
    ) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::minutes(5));
        Self {
            store,
            preset,
            gate,
            clock,
            ttl,
            cache: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn preset(&self) -> MarginPreset {
        self.preset
    }

    /// Current schedule; never fails.
    pub async fn get_config(&self) -> PricingConfig {
        let now = self.clock.now();
        if let Some(cached) = self.cache.read().as_ref() {
            if now - cached.fetched_at < self.ttl {
                return cached.config.clone();
            }
        }

        let generation = self.generation.load(Ordering::Acquire);
        match self.load().await {
            Ok(config) => {
                let mut cache = self.cache.write();
                if self.generation.load(Ordering::Acquire) == generation {
                    *cache = Some(CachedConfig {
                        config: config.clone(),
                        fetched_at: now,
                    });
                }
                config
            }
            Err(e) => {
                warn!(
                    error = %e,
                    preset = %self.preset,
                    "Failed to load pricing config, using preset default"
                );
                self.preset.config(now)
            }
        }
    }

    async fn load(&self) -> Result<PricingConfig> {
        if let Some(config) = self.store.read().await? {
            debug!(updated_by = %config.updated_by, "Loaded pricing config from store");
            return Ok(config);
        }

        info!(preset = %self.preset, "No pricing config stored, initializing default");
        let default = self.preset.config(self.clock.now());
        self.store.initialize_default(&default).await
    }

    /// Drop the cached schedule so the next read goes to the store
    pub fn invalidate(&self) {
        let mut cache = self.cache.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        *cache = None;
    }

    /// Replace the schedule with an admin-submitted one.
    ///
    /// Nothing is written unless the credential is accepted and the payload
    /// validates.
    pub async fn update(
        &self,
        credential: Option<&str>,
        update: ConfigUpdate,
        updated_by: Option<&str>,
    ) -> Result<PricingConfig> {
        self.gate.authorize(credential)?;

        let current = self.get_config().await;
        let updated_by = actor(updated_by, "admin");
        let config = update.apply(&current, &updated_by, self.clock.now())?;

        let saved = self.store.write(&config).await?;
        self.invalidate();

        info!(updated_by = %saved.updated_by, "Pricing config updated");
        Ok(saved)
    }

    /// Restore the preset default schedule
    pub async fn reset(
        &self,
        credential: Option<&str>,
        updated_by: Option<&str>,
    ) -> Result<PricingConfig> {
        self.gate.authorize(credential)?;

        let mut config = self.preset.config(self.clock.now());
        config.updated_by = actor(updated_by, "admin (reset)");

        let saved = self.store.write(&config).await?;
        self.invalidate();

        info!(preset = %self.preset, updated_by = %saved.updated_by, "Pricing config reset");
        Ok(saved)
    }
}

fn actor(updated_by: Option<&str>, default: &str) -> String {
    updated_by
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
