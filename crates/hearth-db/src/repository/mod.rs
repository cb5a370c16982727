//! # Repository Module
//!
//! Persistence interfaces for orders and dining tables, with a SQLite
//! implementation for production and an in-memory one for tests.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BillingService<O: OrderRepository, T: TableRepository>                │
//! │       │                                                                 │
//! │       │  orders.get_by_id(id) → mutate in hearth-core → orders.update  │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐        │
//! │  │ SqliteOrderRepository    │      │ InMemoryOrderRepository  │        │
//! │  │ SqliteTableRepository    │      │ InMemoryTableRepository  │        │
//! │  └────────────┬─────────────┘      └──────────────────────────┘        │
//! │               ▼                       (service + HTTP tests)           │
//! │          SQLite file                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optimistic Versioning
//! Every row has a `version`. `update` only succeeds when the caller's
//! copy still carries the stored version, then bumps it:
//!
//! ```text
//! UPDATE orders SET ..., version = version + 1 WHERE id = ? AND version = ?
//!   rows_affected == 0 → NotFound (no row) or VersionConflict (stale copy)
//! ```

use std::future::Future;

use chrono::NaiveDate;
use hearth_core::{Order, OrderStatus, Table};

use crate::error::DbResult;

pub mod memory;
pub mod order;
pub mod table;

/// Storage for the order aggregate.
///
/// `insert` and `update` set `order.version` to the stored version.
pub trait OrderRepository: Send + Sync {
    fn insert(&self, order: &mut Order) -> impl Future<Output = DbResult<()>> + Send;

    fn update(&self, order: &mut Order) -> impl Future<Output = DbResult<()>> + Send;

    fn get_by_id(&self, id: &str) -> impl Future<Output = DbResult<Option<Order>>> + Send;

    /// Newest first, optionally filtered by status.
    fn list(
        &self,
        status: Option<OrderStatus>,
    ) -> impl Future<Output = DbResult<Vec<Order>>> + Send;

    /// All orders opened on `date`, oldest first.
    fn list_by_date(&self, date: NaiveDate)
        -> impl Future<Output = DbResult<Vec<Order>>> + Send;

    /// Number of orders opened on `date` (drives the order number sequence).
    fn count_for_date(&self, date: NaiveDate) -> impl Future<Output = DbResult<u32>> + Send;
}

/// Storage for dining tables.
pub trait TableRepository: Send + Sync {
    fn insert(&self, table: &mut Table) -> impl Future<Output = DbResult<()>> + Send;

    fn update(&self, table: &mut Table) -> impl Future<Output = DbResult<()>> + Send;

    fn get_by_id(&self, id: &str) -> impl Future<Output = DbResult<Option<Table>>> + Send;

    fn get_by_number(&self, number: u32)
        -> impl Future<Output = DbResult<Option<Table>>> + Send;

    /// Ordered by table number.
    fn list(&self) -> impl Future<Output = DbResult<Vec<Table>>> + Send;
}
