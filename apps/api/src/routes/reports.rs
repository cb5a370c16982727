//! Report routes.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use hearth_core::report::SalesSummary;

use super::ApiQuery;
use crate::error::ApiResult;
use crate::state::{AppState, BillingState};

pub fn router() -> Router<AppState> {
    Router::new().route("/reports/daily", get(daily))
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    /// Business date (`YYYY-MM-DD`, UTC). Defaults to today.
    pub date: Option<NaiveDate>,
}

/// GET /reports/daily?date=2024-03-01
async fn daily(
    State(billing): State<BillingState>,
    ApiQuery(query): ApiQuery<DailyQuery>,
) -> ApiResult<Json<SalesSummary>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(billing.daily_report(date).await?))
}
