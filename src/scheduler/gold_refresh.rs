//! Daily gold price refresh
//!
//! Quote pages publish the day's rate in the morning, so the cache is
//! refreshed once a day at the cutoff hour (IST) instead of on a fixed
//! interval. Requests arriving before the refresh still see yesterday's
//! quote.

use crate::providers::gold_price::next_cutoff;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct GoldRefreshScheduler {
    state: Arc<AppState>,
}

impl GoldRefreshScheduler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Time from `now` until the next `hour:00` IST
    pub fn duration_until(now: DateTime<Utc>, hour: u32) -> Duration {
        (next_cutoff(now, hour) - now)
            .to_std()
            .unwrap_or(Duration::from_secs(60))
    }

    /// Spawn the refresh loop on the runtime
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let hour = self.state.gold.cutoff_hour();
            info!("Gold refresh scheduler started ({:02}:00 IST)", hour);

            loop {
                let duration = Self::duration_until(self.state.clock.now(), hour);
                info!(
                    "Next gold price refresh in {} hours {} minutes",
                    duration.as_secs() / 3600,
                    (duration.as_secs() % 3600) / 60
                );

                tokio::time::sleep(duration).await;
                self.run_once().await;
            }
        })
    }

    /// Refresh now; failures are logged and the cached quote kept
    pub async fn run_once(&self) -> bool {
        match self.state.gold.force_refresh().await {
            Ok(spot) => {
                self.state.pricing.clear_cache();
                info!(price = spot.price_24k, "Scheduled gold price refresh complete");
                true
            }
            Err(e) => {
                warn!(error = %e, "Scheduled gold price refresh failed, keeping cached price");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;
    use chrono::TimeZone;

    #[test]
    fn test_duration_until_cutoff() {
        // 07:00 IST
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 1, 30, 0).unwrap();
        assert_eq!(
            GoldRefreshScheduler::duration_until(now, 8),
            Duration::from_secs(3600)
        );

        // 08:00 IST exactly waits a full day
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 2, 30, 0).unwrap();
        assert_eq!(
            GoldRefreshScheduler::duration_until(now, 8),
            Duration::from_secs(24 * 3600)
        );
    }

    #[tokio::test]
    async fn test_run_once_refreshes_and_clears_quotes() {
        let state = Arc::new(test_state());
        state.pricing.quote("18K Gold: 2g", "18K").await;
        assert_eq!(state.pricing.cached_quotes(), 1);

        let scheduler = GoldRefreshScheduler::new(state.clone());
        assert!(scheduler.run_once().await);
        assert_eq!(state.pricing.cached_quotes(), 0);
        assert!(state.gold.current().is_some());
    }
}
