//! End-to-end tests through the full router over an in-memory database.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use hearth_api::build_app;
use hearth_api::state::{AppConfig, AppState};
use hearth_db::{Database, DbConfig};

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build_app(AppState::new(db, AppConfig::default()))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn paneer_tikka(quantity: i64) -> Value {
    json!({
        "menuItem": { "id": "paneer-tikka", "name": "Paneer Tikka", "price": 42000 },
        "quantity": quantity
    })
}

async fn create_table(app: &Router, number: u32) -> String {
    let (status, table) = call(
        app,
        Method::POST,
        "/tables",
        Some(json!({ "number": number, "capacity": 4, "section": "Main Hall" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    table["id"].as_str().unwrap().to_string()
}

async fn open_dine_in(app: &Router, table_id: &str, quantity: i64) -> Value {
    let (status, order) = call(
        app,
        Method::POST,
        "/orders",
        Some(json!({
            "orderType": "dine-in",
            "tableId": table_id,
            "items": [paneer_tikka(quantity)]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    order
}

#[tokio::test]
async fn dine_in_order_from_seating_to_settlement() {
    let app = app().await;
    let table_id = create_table(&app, 4).await;
    let order = open_dine_in(&app, &table_id, 1).await;
    let id = order["id"].as_str().unwrap().to_string();
    let line_id = order["items"][0]["id"].as_str().unwrap().to_string();

    let (_, table) = call(&app, Method::GET, &format!("/tables/{table_id}"), None).await;
    assert_eq!(table["status"], "occupied");
    assert_eq!(table["currentOrder"]["orderId"], id.as_str());

    let (status, order) = call(
        &app,
        Method::PATCH,
        &format!("/orders/{id}/items"),
        Some(json!({ "action": "increment", "itemId": line_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["items"][0]["quantity"], 2);

    let (status, order) = call(
        &app,
        Method::PUT,
        &format!("/orders/{id}/discount"),
        Some(json!({ "type": "percentage", "value": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["totals"]["subtotal"], 84000);
    assert_eq!(order["totals"]["discountAmount"], 8400);
    assert_eq!(order["totals"]["grandTotal"], 83300);

    let (status, kot) = call(&app, Method::POST, &format!("/orders/{id}/kot"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kot["order"]["state"]["status"], "kot-sent");

    let (status, _) = call(&app, Method::POST, &format!("/orders/{id}/bill"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, paid) = call(
        &app,
        Method::POST,
        &format!("/orders/{id}/payments"),
        Some(json!({ "method": "cash", "amount": 50000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(paid["balanceDue"], 33300);

    let (status, err) = call(&app, Method::POST, &format!("/orders/{id}/settle"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "INSUFFICIENT_PAYMENT");

    let (status, paid) = call(
        &app,
        Method::POST,
        &format!("/orders/{id}/payments"),
        Some(json!({ "method": "upi", "amount": 33300, "reference": "UPI-778" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(paid["balanceDue"], 0);

    let (status, settled) = call(&app, Method::POST, &format!("/orders/{id}/settle"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settled["state"]["status"], "settled");

    let (_, table) = call(&app, Method::GET, &format!("/tables/{table_id}"), None).await;
    assert_eq!(table["status"], "cleaning");
    assert!(table["currentOrder"].is_null());

    let (status, table) = call(
        &app,
        Method::POST,
        &format!("/tables/{table_id}/clean"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table["status"], "available");

    let (status, err) = call(
        &app,
        Method::POST,
        &format!("/orders/{id}/void"),
        Some(json!({ "reason": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "INVALID_TRANSITION");

    let (status, report) = call(&app, Method::GET, "/reports/daily", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["settledOrders"], 1);
    assert_eq!(report["collected"], 83300);
}

#[tokio::test]
async fn error_responses_carry_codes() {
    let app = app().await;

    let (status, err) = call(&app, Method::GET, "/orders/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");

    let (status, err) = call(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "orderType": "buffet" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");

    let table_id = create_table(&app, 1).await;
    open_dine_in(&app, &table_id, 1).await;
    let (status, err) = call(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "orderType": "dine-in", "tableId": table_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "CONFLICT");

    let (status, err) = call(
        &app,
        Method::POST,
        "/tables",
        Some(json!({ "number": 1, "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "CONFLICT");
}

#[tokio::test]
async fn takeaway_discount_bounds_and_void() {
    let app = app().await;
    let (status, order) = call(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "orderType": "takeaway", "items": [paneer_tikka(1)] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["totals"]["serviceCharge"], 0);

    let (status, err) = call(
        &app,
        Method::PUT,
        &format!("/orders/{id}/discount"),
        Some(json!({ "type": "percentage", "value": 15000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_DISCOUNT");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/orders/{id}/void"),
        Some(json!({ "reason": "customer cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, voided) = call(&app, Method::GET, "/orders?status=void", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voided.as_array().unwrap().len(), 1);

    let (status, active) = call(&app, Method::GET, "/orders?status=active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(active.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn pricing_update_applies_to_new_orders_only() {
    let app = app().await;
    let (_, before) = call(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "orderType": "takeaway", "items": [paneer_tikka(1)] })),
    )
    .await;
    let before_id = before["id"].as_str().unwrap().to_string();

    let (status, mut pricing) = call(&app, Method::GET, "/config/pricing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pricing["taxRatePercent"], 5.0);

    pricing["taxRatePercent"] = json!(12.0);
    let (status, updated) = call(&app, Method::PUT, "/config/pricing", Some(pricing.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["taxRatePercent"], 12.0);

    pricing["taxRatePercent"] = json!(-3.0);
    let (status, _) = call(&app, Method::PUT, "/config/pricing", Some(pricing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, after) = call(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "orderType": "takeaway", "items": [paneer_tikka(1)] })),
    )
    .await;
    assert_eq!(after["totals"]["tax"], 5040);

    let (_, before) = call(&app, Method::GET, &format!("/orders/{before_id}"), None).await;
    assert_eq!(before["totals"]["tax"], 2100);

    let (status, config) = call(&app, Method::GET, "/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["pricing"]["taxRatePercent"], 12.0);
}

#[tokio::test]
async fn health_and_support_sessions() {
    let app = app().await;

    let (status, health) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["database"], "ok");

    let (status, session) = call(
        &app,
        Method::POST,
        "/support/sessions",
        Some(json!({ "agent": "asha@support", "reason": "Printer mapping", "durationMinutes": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["id"].as_str().unwrap().to_string();

    let (_, sessions) = call(&app, Method::GET, "/support/sessions", None).await;
    assert_eq!(sessions.as_array().unwrap().len(), 1);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/support/sessions/{session_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = call(
        &app,
        Method::GET,
        &format!("/support/sessions/{session_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");

    let (status, _) = call(
        &app,
        Method::POST,
        "/support/sessions",
        Some(json!({ "agent": "asha@support", "reason": "x", "durationMinutes": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
