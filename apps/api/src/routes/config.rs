//! Configuration routes.
//!
//! Pricing changes apply to orders opened afterwards; open orders keep
//! the policy they were created with.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::ApiJson;
use crate::error::ApiResult;
use crate::state::{AppState, ConfigState, ConfigView, PricingConfig};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(view))
        .route("/config/pricing", get(pricing).put(update_pricing))
}

async fn view(State(config): State<ConfigState>) -> Json<ConfigView> {
    Json(config.view().await)
}

async fn pricing(State(config): State<ConfigState>) -> Json<PricingConfig> {
    Json(config.view().await.pricing)
}

/// PUT /config/pricing - validate and swap the live policy
async fn update_pricing(
    State(config): State<ConfigState>,
    ApiJson(update): ApiJson<PricingConfig>,
) -> ApiResult<Json<PricingConfig>> {
    let policy = config.update_pricing(&update).await?;
    Ok(Json(PricingConfig::from_policy(&policy)))
}
