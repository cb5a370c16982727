//! Support session routes.
//!
//! Time-boxed grants that let a support agent into this store. Sessions
//! live in memory only and vanish on expiry or restart.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use hearth_core::support::{SupportGrant, SupportSession};

use super::ApiJson;
use crate::error::ApiResult;
use crate::state::{AppState, SupportState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/support/sessions", get(list).post(grant))
        .route("/support/sessions/{id}", get(get_by_id).delete(revoke))
}

async fn list(State(support): State<SupportState>) -> Json<Vec<SupportSession>> {
    Json(support.active())
}

async fn grant(
    State(support): State<SupportState>,
    ApiJson(request): ApiJson<SupportGrant>,
) -> ApiResult<(StatusCode, Json<SupportSession>)> {
    let session = support.grant(request)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_by_id(
    State(support): State<SupportState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SupportSession>> {
    Ok(Json(support.get(&id)?))
}

async fn revoke(
    State(support): State<SupportState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SupportSession>> {
    Ok(Json(support.revoke(&id)?))
}
