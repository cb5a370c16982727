//! # Billing Service
//!
//! Orchestrates the order and table aggregates over the repositories.
//! Every rule lives in hearth-core; this layer loads, applies, saves and
//! keeps a dine-in order's table in step with it.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler                                                                │
//! │     │  service.add_payment(id, request)                                 │
//! │     ▼                                                                   │
//! │  orders.get_by_id ──► Order::add_payment (hearth-core) ──► orders.update│
//! │                                                     │  version check    │
//! │                                                     ▼                   │
//! │                                   stale copy? ──► 409 CONFLICT          │
//! │     │                                                                   │
//! │     ▼  (dine-in only)                                                   │
//! │  tables.get_by_id ──► Table::refresh / release ──► tables.update        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Table Side Effects
//! | Order event | Table |
//! |---|---|
//! | open (with table) | available/reserved → occupied |
//! | item / discount / payment change | summary refreshed |
//! | settle | occupied → cleaning |
//! | void | occupied → available |
//!
//! The order write is authoritative. Table writes retry on a version
//! conflict. Once the order is saved, a failed table refresh or release
//! is logged and does not fail the request.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use hearth_core::report::SalesSummary;
use hearth_core::{
    CoreError, CoreResult, Discount, KitchenTicket, Money, NewOrderItem, Order, OrderNumber,
    OrderStatus, OrderType, Payment, PaymentMethod, PricingPolicy, Table, TableStatus,
};
use hearth_db::{DbError, OrderRepository, TableRepository};

use crate::error::{ApiError, ApiResult};

/// Attempts to claim an order number before giving up.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Attempts to write a table before giving up on version conflicts.
const TABLE_WRITE_ATTEMPTS: u32 = 3;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrderRequest {
    pub order_type: OrderType,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

/// `PATCH /orders/{id}/items` body.
///
/// ```json
/// { "action": "set-quantity", "itemId": "…", "quantity": 3 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ItemAction {
    Add { item: NewOrderItem },
    Increment { item_id: String },
    Decrement { item_id: String },
    SetQuantity { item_id: String, quantity: i64 },
    Remove { item_id: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPaymentRequest {
    pub method: PaymentMethod,
    pub amount: Money,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub number: u32,
    pub capacity: u32,
    #[serde(default)]
    pub section: Option<String>,
}

/// Manual table moves (`POST /tables/{id}/{action}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableAction {
    Reserve,
    CancelReservation,
    Clean,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KotResponse {
    pub ticket: KitchenTicket,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment: Payment,
    pub balance_due: Money,
    pub tendered: Money,
    pub order: Order,
}

// =============================================================================
// Service
// =============================================================================

/// Billing and settlement over any pair of repositories.
#[derive(Debug, Clone)]
pub struct BillingService<O, T> {
    orders: O,
    tables: T,
}

impl<O: OrderRepository, T: TableRepository> BillingService<O, T> {
    pub fn new(orders: O, tables: T) -> Self {
        BillingService { orders, tables }
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Opens an order under `policy`, seating it if a table is given.
    pub async fn open_order(
        &self,
        request: OpenOrderRequest,
        policy: PricingPolicy,
    ) -> ApiResult<Order> {
        let table = match &request.table_id {
            Some(table_id) => {
                if request.order_type != OrderType::DineIn {
                    return Err(ApiError::validation(format!(
                        "Only dine-in orders can be seated, not {}",
                        request.order_type.as_str()
                    )));
                }
                let table = self.load_table(table_id).await?;
                if !matches!(table.status, TableStatus::Available | TableStatus::Reserved) {
                    return Err(CoreError::TableUnavailable {
                        table: table.number,
                        status: table.status,
                    }
                    .into());
                }
                Some(table)
            }
            None => None,
        };

        let today = Utc::now().date_naive();
        let mut attempt = 0;
        let mut order = loop {
            let sequence = self.orders.count_for_date(today).await? + 1 + attempt;
            let mut order = Order::new(
                OrderNumber::new(today, sequence),
                request.order_type,
                policy.clone(),
            );
            if let Some(table) = &table {
                order = order.with_table(table.id.clone(), table.number);
            }
            for item in request.items.iter().cloned() {
                order.add_item(item)?;
            }

            match self.orders.insert(&mut order).await {
                Ok(()) => break order,
                Err(DbError::UniqueViolation { .. }) if attempt + 1 < ORDER_NUMBER_ATTEMPTS => {
                    debug!(order_number = %order.order_number, "Order number taken, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if let Some(table) = table {
            let seated = self.update_table(&table.id, |t| t.occupy(&order)).await;
            if let Err(err) = seated {
                warn!(
                    order_id = %order.id,
                    table = table.number,
                    error = %err,
                    "Table taken while opening order, voiding it"
                );
                order.void("table unavailable", Utc::now())?;
                if let Err(void_err) = self.orders.update(&mut order).await {
                    error!(
                        order_id = %order.id,
                        seating_error = %err,
                        error = %void_err,
                        "Unseated order could not be voided"
                    );
                    return Err(void_err.into());
                }
                return Err(err);
            }
        }

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            order_type = order.order_type.as_str(),
            table = ?order.table_number,
            "Order opened"
        );
        Ok(order)
    }

    pub async fn get_order(&self, id: &str) -> ApiResult<Order> {
        self.load_order(id).await
    }

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> ApiResult<Vec<Order>> {
        Ok(self.orders.list(status).await?)
    }

    pub async fn edit_items(&self, id: &str, action: ItemAction) -> ApiResult<Order> {
        debug!(order_id = %id, ?action, "Editing items");
        let (order, ()) = self
            .modify(id, |order| match action {
                ItemAction::Add { item } => order.add_item(item).map(|_| ()),
                ItemAction::Increment { item_id } => order.increment_item(&item_id),
                ItemAction::Decrement { item_id } => order.decrement_item(&item_id),
                ItemAction::SetQuantity { item_id, quantity } => {
                    order.set_quantity(&item_id, quantity)
                }
                ItemAction::Remove { item_id } => order.remove_item(&item_id),
            })
            .await?;

        self.refresh_table(&order).await;
        Ok(order)
    }

    pub async fn apply_discount(&self, id: &str, discount: Discount) -> ApiResult<Order> {
        let (order, ()) = self.modify(id, |o| o.apply_discount(discount)).await?;
        info!(order_id = %id, ?discount, grand_total = %order.totals().grand_total, "Discount applied");
        self.refresh_table(&order).await;
        Ok(order)
    }

    pub async fn clear_discount(&self, id: &str) -> ApiResult<Order> {
        let (order, ()) = self.modify(id, Order::clear_discount).await?;
        self.refresh_table(&order).await;
        Ok(order)
    }

    pub async fn mark_no_charge(&self, id: &str, reason: &str) -> ApiResult<Order> {
        let (order, ()) = self.modify(id, |o| o.mark_no_charge(reason)).await?;
        info!(order_id = %id, reason, "Order marked no-charge");
        self.refresh_table(&order).await;
        Ok(order)
    }

    pub async fn clear_no_charge(&self, id: &str) -> ApiResult<Order> {
        let (order, ()) = self.modify(id, Order::clear_no_charge).await?;
        self.refresh_table(&order).await;
        Ok(order)
    }

    pub async fn send_kot(&self, id: &str) -> ApiResult<KotResponse> {
        let (order, ticket) = self.modify(id, |o| o.generate_kot(Utc::now())).await?;
        info!(
            order_id = %id,
            kot = ticket.kot_number,
            lines = ticket.lines.len(),
            "KOT sent"
        );
        self.refresh_table(&order).await;
        Ok(KotResponse { ticket, order })
    }

    pub async fn print_bill(&self, id: &str) -> ApiResult<Order> {
        let (order, ()) = self.modify(id, |o| o.print_bill().map(|_| ())).await?;
        info!(order_id = %id, grand_total = %order.totals().grand_total, "Bill printed");
        Ok(order)
    }

    pub async fn add_payment(
        &self,
        id: &str,
        request: AddPaymentRequest,
    ) -> ApiResult<PaymentResponse> {
        let (order, payment) = self
            .modify(id, |o| {
                o.add_payment(request.method, request.amount, request.reference)
            })
            .await?;
        info!(
            order_id = %id,
            method = payment.method.as_str(),
            amount = %payment.amount,
            balance_due = %order.balance_due(),
            "Payment added"
        );
        Ok(PaymentResponse {
            balance_due: order.balance_due(),
            tendered: order.tendered(),
            payment,
            order,
        })
    }

    pub async fn remove_payment(&self, id: &str, payment_id: &str) -> ApiResult<Order> {
        let (order, removed) = self.modify(id, |o| o.remove_payment(payment_id)).await?;
        info!(order_id = %id, payment_id = %removed.id, "Payment removed");
        Ok(order)
    }

    /// Completes settlement and sends a seated table to cleaning.
    ///
    /// A zero-total order with no open tenders (NC bill) settles without
    /// payments.
    pub async fn settle(&self, id: &str) -> ApiResult<Order> {
        let (order, ()) = self
            .modify(id, |o| {
                let now = Utc::now();
                if o.collection().is_none() && o.totals().grand_total.is_zero() {
                    o.settle_no_charge(now)
                } else {
                    o.complete_payment(now)
                }
            })
            .await?;
        info!(
            order_id = %id,
            order_number = %order.order_number,
            paid = %order.paid(),
            "Order settled"
        );

        self.release_table(&order, Table::release_for_cleaning).await;
        Ok(order)
    }

    /// Voids the order and frees a seated table.
    pub async fn void(&self, id: &str, reason: &str) -> ApiResult<Order> {
        let (order, ()) = self.modify(id, |o| o.void(reason, Utc::now())).await?;
        info!(order_id = %id, reason, "Order voided");

        self.release_table(&order, Table::release).await;
        Ok(order)
    }

    // -------------------------------------------------------------------------
    // Tables
    // -------------------------------------------------------------------------

    pub async fn create_table(&self, request: CreateTableRequest) -> ApiResult<Table> {
        let mut table = Table::new(request.number, request.capacity, request.section.as_deref())?;
        self.tables.insert(&mut table).await?;
        info!(table = table.number, capacity = table.capacity, "Table created");
        Ok(table)
    }

    pub async fn get_table(&self, id: &str) -> ApiResult<Table> {
        self.load_table(id).await
    }

    pub async fn list_tables(&self) -> ApiResult<Vec<Table>> {
        Ok(self.tables.list().await?)
    }

    pub async fn table_action(&self, id: &str, action: TableAction) -> ApiResult<Table> {
        let table = self
            .update_table(id, |t| match action {
                TableAction::Reserve => t.reserve(),
                TableAction::CancelReservation => t.cancel_reservation(),
                TableAction::Clean => t.mark_clean(),
            })
            .await?;
        info!(table = table.number, status = %table.status, "Table updated");
        Ok(table)
    }

    // -------------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------------

    pub async fn daily_report(&self, date: NaiveDate) -> ApiResult<SalesSummary> {
        let orders = self.orders.list_by_date(date).await?;
        Ok(SalesSummary::from_orders(date, orders.iter()))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn load_order(&self, id: &str) -> ApiResult<Order> {
        self.orders
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", id))
    }

    async fn load_table(&self, id: &str) -> ApiResult<Table> {
        self.tables
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Table", id))
    }

    /// Loads an order, applies `apply` and saves it under the version check.
    async fn modify<R, F>(&self, id: &str, apply: F) -> ApiResult<(Order, R)>
    where
        F: FnOnce(&mut Order) -> CoreResult<R> + Send,
        R: Send,
    {
        let mut order = self.load_order(id).await?;
        let result = apply(&mut order)?;
        self.orders.update(&mut order).await?;
        Ok((order, result))
    }

    /// Applies `apply` to a fresh copy of the table, retrying on conflicts.
    async fn update_table<F>(&self, id: &str, apply: F) -> ApiResult<Table>
    where
        F: Fn(&mut Table) -> CoreResult<()> + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut table = self.load_table(id).await?;
            apply(&mut table)?;

            match self.tables.update(&mut table).await {
                Ok(()) => return Ok(table),
                Err(DbError::VersionConflict { .. }) if attempt < TABLE_WRITE_ATTEMPTS => {
                    debug!(table_id = %id, attempt, "Table changed underneath, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Mirrors the order's running total onto its table card.
    async fn refresh_table(&self, order: &Order) {
        let Some(table_id) = &order.table_id else {
            return;
        };
        if order.status().is_terminal() {
            return;
        }
        if let Err(err) = self.update_table(table_id, |t| t.refresh(order)).await {
            warn!(order_id = %order.id, table_id = %table_id, error = %err, "Table summary not refreshed");
        }
    }

    /// Releases the order's table if it still holds `order`.
    ///
    /// The order is already committed, so a failure here is logged and the
    /// table is left for a manual fix from the floor view.
    async fn release_table(&self, order: &Order, release: fn(&mut Table) -> CoreResult<()>) {
        let Some(table_id) = &order.table_id else {
            return;
        };
        if let Err(err) = self.try_release_table(table_id, order, release).await {
            warn!(
                order_id = %order.id,
                table_id = %table_id,
                status = %order.status(),
                error = %err,
                "Table not released"
            );
        }
    }

    async fn try_release_table(
        &self,
        table_id: &str,
        order: &Order,
        release: fn(&mut Table) -> CoreResult<()>,
    ) -> ApiResult<()> {
        let seated = |t: &Table| {
            t.current_order
                .as_ref()
                .is_some_and(|current| current.order_id == order.id)
        };

        let table = self.load_table(table_id).await?;
        if !seated(&table) {
            warn!(order_id = %order.id, table = table.number, "Table no longer holds this order");
            return Ok(());
        }

        let table = self
            .update_table(table_id, |t| if seated(&*t) { release(t) } else { Ok(()) })
            .await?;
        info!(table = table.number, status = %table.status, "Table released");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
