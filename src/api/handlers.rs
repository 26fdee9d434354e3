//! REST API endpoint handlers

use crate::api::types::*;
use crate::error::{AppError, Result};
use crate::pricing::format::format_inr;
use crate::pricing::Karat;
use crate::providers::gold_price::karat_rates;
use crate::state::AppState;
use axum::extract::{Json, State};
use std::sync::Arc;
use tracing::info;

pub type SharedState = Arc<AppState>;

// ============================================================================
// Health Check
// ============================================================================

/// GET /health
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: state.clock.now(),
        preset: state.config.preset().to_string(),
        gold_price_cached: state.gold.current().is_some(),
        admin_enabled: state.settings.admin_password.is_some(),
    })
}

// ============================================================================
// Pricing Config
// ============================================================================

/// GET /api/pricing-config
pub async fn get_pricing_config(State(state): State<SharedState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        success: true,
        config: state.config.get_config().await,
    })
}

/// POST /api/pricing-config
pub async fn update_pricing_config(
    State(state): State<SharedState>,
    Json(request): Json<UpdateConfigRequest>,
) -> Result<Json<ConfigResponse>> {
    let config = state
        .config
        .update(
            request.password.as_deref(),
            request.config,
            request.updated_by.as_deref(),
        )
        .await?;

    // quotes priced under the old schedule are unreachable now
    state.pricing.clear_cache();

    Ok(Json(ConfigResponse {
        success: true,
        config,
    }))
}

/// POST /api/pricing-config/reset
pub async fn reset_pricing_config(
    State(state): State<SharedState>,
    Json(request): Json<ResetConfigRequest>,
) -> Result<Json<ConfigResponse>> {
    let config = state
        .config
        .reset(request.password.as_deref(), request.updated_by.as_deref())
        .await?;
    state.pricing.clear_cache();

    Ok(Json(ConfigResponse {
        success: true,
        config,
    }))
}

// ============================================================================
// Gold Price
// ============================================================================

fn gold_response(state: &AppState, spot: crate::providers::GoldSpot) -> GoldPriceResponse {
    GoldPriceResponse {
        success: true,
        city: state.settings.gold_city.clone(),
        price: (spot.price_24k * 100.0).round() / 100.0,
        unit: "INR per gram",
        date: spot.fetched_on,
        source: spot.source,
        karat_rates: karat_rates(spot.price_24k),
        next_update: state.gold.next_update(),
    }
}

/// GET /api/gold-price
pub async fn get_gold_price(State(state): State<SharedState>) -> Json<GoldPriceResponse> {
    let spot = state.gold.get_gold_price().await;
    Json(gold_response(&state, spot))
}

/// POST /api/gold-price - force a refresh from the quote source
pub async fn refresh_gold_price(State(state): State<SharedState>) -> Result<Json<GoldPriceResponse>> {
    info!("Manual gold price refresh requested");
    let spot = state.gold.force_refresh().await?;
    state.pricing.clear_cache();
    Ok(Json(gold_response(&state, spot)))
}

// ============================================================================
// Product Quotes
// ============================================================================

/// POST /api/price
pub async fn price_product(
    State(state): State<SharedState>,
    Json(request): Json<PriceRequest>,
) -> Result<Json<PriceResponse>> {
    if request.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }

    let response = match request.karat.as_deref() {
        Some(label) => {
            let karat: Karat = label.parse()?;
            let breakdown = state
                .pricing
                .quote(&request.description, karat.label())
                .await
                .ok_or_else(|| AppError::Validation(format!("Unrecognized karat '{}'", label)))?;
            PriceResponse::Single {
                success: true,
                karat,
                breakdown,
                formatted_total: format_inr(breakdown.total),
            }
        }
        None => {
            let result = state.pricing.quote_all_karats(&request.description).await?;
            PriceResponse::AllKarats {
                success: result.success,
                spot_price: result.spot_price,
                details: result.details,
                prices: result.prices,
            }
        }
    };

    Ok(Json(response))
}
