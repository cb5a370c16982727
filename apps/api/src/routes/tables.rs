//! Table routes.
//!
//! Seating and release follow the order lifecycle; only reservations and
//! cleaning are moved by hand (`POST /tables/{id}/{action}` with
//! `reserve`, `cancel-reservation` or `clean`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use hearth_core::Table;

use super::ApiJson;
use crate::error::ApiResult;
use crate::service::{CreateTableRequest, TableAction};
use crate::state::{AppState, BillingState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list).post(create))
        .route("/tables/{id}", get(get_by_id))
        .route("/tables/{id}/{action}", post(action))
}

/// GET /tables - floor plan, by table number
async fn list(State(billing): State<BillingState>) -> ApiResult<Json<Vec<Table>>> {
    Ok(Json(billing.list_tables().await?))
}

async fn create(
    State(billing): State<BillingState>,
    ApiJson(request): ApiJson<CreateTableRequest>,
) -> ApiResult<(StatusCode, Json<Table>)> {
    let table = billing.create_table(request).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn get_by_id(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Table>> {
    Ok(Json(billing.get_table(&id).await?))
}

async fn action(
    State(billing): State<BillingState>,
    Path((id, action)): Path<(String, TableAction)>,
) -> ApiResult<Json<Table>> {
    Ok(Json(billing.table_action(&id, action).await?))
}
