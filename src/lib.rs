//! Jewel Pricing - dynamic jewelry pricing engine
//!
//! Prices diamond jewelry from free-form product descriptions using a
//! breakpoint diamond rate table, an admin-editable margin schedule and the
//! daily 24K gold spot price. Serves quotes over HTTP and exports catalog
//! price sheets as CSV.

pub mod api;
pub mod batch;
pub mod clock;
pub mod db;
pub mod error;
pub mod pricing;
pub mod providers;
pub mod scheduler;
pub mod security;
pub mod services;
pub mod settings;
pub mod state;

use api::ApiServer;
use error::Result;
use scheduler::GoldRefreshScheduler;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. Output goes to stderr so command output on
/// stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jewel_pricing=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the API server and daily gold refresh until Ctrl-C
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    tracing::info!(
        preset = %state.settings.pricing_preset,
        quote_format = %state.settings.gold_quote_format,
        "Starting Jewel Pricing..."
    );

    // Seed the schedule row so the first request doesn't pay for it
    let config = state.config.get_config().await;
    tracing::info!(updated_by = %config.updated_by, "Pricing config ready");

    let mut server = ApiServer::new();
    server.start(state.clone()).await?;

    let scheduler = GoldRefreshScheduler::new(state.clone()).start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    scheduler.abort();
    server.stop();
    server.join().await;
    Ok(())
}
