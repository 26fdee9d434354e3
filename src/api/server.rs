//! HTTP server for the pricing API

use crate::api::handlers::{self, SharedState};
use crate::error::{AppError, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router with all routes
pub fn router(state: SharedState) -> Router {
    // Storefront pages call the API from the browser
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ================================================================
        // Health check
        // ================================================================
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))

        // ================================================================
        // Pricing schedule
        // ================================================================
        .route(
            "/api/pricing-config",
            get(handlers::get_pricing_config).post(handlers::update_pricing_config),
        )
        .route("/api/pricing-config/reset", post(handlers::reset_pricing_config))

        // ================================================================
        // Gold price
        // ================================================================
        .route(
            "/api/gold-price",
            get(handlers::get_gold_price).post(handlers::refresh_gold_price),
        )

        // ================================================================
        // Quotes
        // ================================================================
        .route("/api/price", post(handlers::price_product))

        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Pricing API server manager
#[derive(Default)]
pub struct ApiServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind and start serving in the background; returns the bound address
    pub async fn start(&mut self, state: SharedState) -> Result<SocketAddr> {
        let bind = state.settings.bind_address();
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address {}: {}", bind, e)))?;

        let app = router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("Starting pricing API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;

        self.task = Some(tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        }));

        info!("Pricing API server started");
        info!("");
        info!("=== Endpoints ===");
        info!("  GET  http://{}/health", local);
        info!("  GET  http://{}/api/pricing-config", local);
        info!("  POST http://{}/api/pricing-config", local);
        info!("  POST http://{}/api/pricing-config/reset", local);
        info!("  GET  http://{}/api/gold-price", local);
        info!("  POST http://{}/api/gold-price", local);
        info!("  POST http://{}/api/price", local);

        Ok(local)
    }

    /// Send the shutdown signal
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Wait for the server task to finish after `stop`
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("API server task failed: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_server_starts_and_stops() {
        let mut state = test_state();
        state.settings.server_port = 0;
        let state = Arc::new(state);

        let mut server = ApiServer::new();
        let addr = server.start(state).await.unwrap();
        assert!(server.is_running());
        assert_ne!(addr.port(), 0);

        server.stop();
        server.join().await;
        assert!(!server.is_running());
    }
}
