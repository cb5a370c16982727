//! # hearth-db: Database Layer for Hearth POS
//!
//! Persistence for orders and dining tables. SQLite through sqlx in
//! production, `HashMap` repositories for tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hearth POS Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /orders/{id}/payments)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BillingService ── mutates the aggregate through hearth-core           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    hearth-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepository│    │ 001_initial  │  │   │
//! │  │   │ tenant scope  │    │ TableRepository│    │   _schema    │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (HEARTH_DB_PATH)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository traits and implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_db::{Database, DbConfig, OrderRepository};
//!
//! let db = Database::new(DbConfig::new("./data/hearth.db")).await?;
//! let open = db.orders().list(Some(OrderStatus::Active)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::memory::{InMemoryOrderRepository, InMemoryTableRepository};
pub use repository::order::SqliteOrderRepository;
pub use repository::table::SqliteTableRepository;
pub use repository::{OrderRepository, TableRepository};
