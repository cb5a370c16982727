//! Order routes: item editing, discounts, KOT, bill, payments, settlement.
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | POST | `/orders` | [`OpenOrderRequest`] |
//! | GET | `/orders?status=` | |
//! | GET | `/orders/{id}` | |
//! | PATCH | `/orders/{id}/items` | [`ItemAction`] |
//! | PUT / DELETE | `/orders/{id}/discount` | [`Discount`] |
//! | POST / DELETE | `/orders/{id}/no-charge` | `{ "reason" }` |
//! | POST | `/orders/{id}/kot` | |
//! | POST | `/orders/{id}/bill` | |
//! | POST | `/orders/{id}/payments` | [`AddPaymentRequest`] |
//! | DELETE | `/orders/{id}/payments/{payment_id}` | |
//! | POST | `/orders/{id}/settle` | |
//! | POST | `/orders/{id}/void` | `{ "reason" }` |

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use hearth_core::{Discount, Order, OrderStatus};

use super::{ApiJson, ApiQuery};
use crate::error::ApiResult;
use crate::service::{
    AddPaymentRequest, ItemAction, KotResponse, OpenOrderRequest, PaymentResponse,
};
use crate::state::{AppState, BillingState, ConfigState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(open).get(list))
        .route("/orders/{id}", get(get_by_id))
        .route("/orders/{id}/items", patch(edit_items))
        .route("/orders/{id}/discount", put(apply_discount).delete(clear_discount))
        .route("/orders/{id}/no-charge", post(mark_no_charge).delete(clear_no_charge))
        .route("/orders/{id}/kot", post(send_kot))
        .route("/orders/{id}/bill", post(print_bill))
        .route("/orders/{id}/payments", post(add_payment))
        .route("/orders/{id}/payments/{payment_id}", delete(remove_payment))
        .route("/orders/{id}/settle", post(settle))
        .route("/orders/{id}/void", post(void))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
}

/// Body of no-charge and void requests.
#[derive(Debug, Deserialize)]
pub struct ReasonBody {
    pub reason: String,
}

/// POST /orders - open an order under the current pricing policy
async fn open(
    State(billing): State<BillingState>,
    State(config): State<ConfigState>,
    ApiJson(request): ApiJson<OpenOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let policy = config.pricing().await;
    let order = billing.open_order(request, policy).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders - newest first, optionally filtered by status
async fn list(
    State(billing): State<BillingState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(billing.list_orders(query.status).await?))
}

async fn get_by_id(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.get_order(&id).await?))
}

async fn edit_items(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
    ApiJson(action): ApiJson<ItemAction>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.edit_items(&id, action).await?))
}

async fn apply_discount(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
    ApiJson(discount): ApiJson<Discount>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.apply_discount(&id, discount).await?))
}

async fn clear_discount(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.clear_discount(&id).await?))
}

async fn mark_no_charge(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ReasonBody>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.mark_no_charge(&id, &body.reason).await?))
}

async fn clear_no_charge(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.clear_no_charge(&id).await?))
}

/// POST /orders/{id}/kot - ticket for the lines not yet sent
async fn send_kot(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
) -> ApiResult<Json<KotResponse>> {
    Ok(Json(billing.send_kot(&id).await?))
}

/// POST /orders/{id}/bill - print (or reprint) the bill
async fn print_bill(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.print_bill(&id).await?))
}

async fn add_payment(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<AddPaymentRequest>,
) -> ApiResult<(StatusCode, Json<PaymentResponse>)> {
    let response = billing.add_payment(&id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn remove_payment(
    State(billing): State<BillingState>,
    Path((id, payment_id)): Path<(String, String)>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.remove_payment(&id, &payment_id).await?))
}

/// POST /orders/{id}/settle - complete payment and release the table
async fn settle(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.settle(&id).await?))
}

async fn void(
    State(billing): State<BillingState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ReasonBody>,
) -> ApiResult<Json<Order>> {
    Ok(Json(billing.void(&id, &body.reason).await?))
}
