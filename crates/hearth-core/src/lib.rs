//! # hearth-core: Pure Business Logic for Hearth POS
//!
//! Billing and settlement rules for a restaurant point of sale, as pure
//! functions and plain data with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hearth POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Admin front-end (browser)                      │   │
//! │  │   Order panel ──► Settlement dialog ──► Payment modal          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hearth-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────┐   │   │
//! │  │   │  money   │ │   bill   │ │ settlement │ │   payment    │   │   │
//! │  │   │  Money   │ │  Bill    │ │ OrderState │ │  Payment     │   │   │
//! │  │   │  Rate    │ │Calculator│ │  events    │ │  Collector   │   │   │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └──────────────┘   │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────┐   │   │
//! │  │   │  order   │ │  table   │ │  pricing   │ │ support/report│  │   │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   hearth-db (SQLite layer)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] / [`types`] - Money, rates, menu snapshots, payments
//! - [`pricing`] - Tenant pricing policy (tax, service charge, rounding)
//! - [`bill`] - Bill calculator
//! - [`settlement`] - Order lifecycle state machine
//! - [`order`] - Order aggregate and kitchen tickets
//! - [`payment`] - Split-tender payment collector
//! - [`table`] - Dining table lifecycle
//! - [`support`] - Time-boxed support access sessions
//! - [`report`] - Daily sales summary
//! - [`error`] / [`validation`] - Typed errors and input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use hearth_core::order::{NewOrderItem, Order, OrderNumber};
//! use hearth_core::pricing::PricingPolicy;
//! use hearth_core::{MenuItemRef, Money, OrderType, PaymentMethod};
//!
//! let number = OrderNumber::new(chrono::Utc::now().date_naive(), 1);
//! let mut order = Order::new(number, OrderType::Takeaway, PricingPolicy::default());
//!
//! order.add_item(NewOrderItem::new(
//!     MenuItemRef {
//!         id: "veg-biryani".into(),
//!         name: "Veg Biryani".into(),
//!         price: Money::from_paise(20_000),
//!         takeaway_price: None,
//!     },
//!     1,
//! )).unwrap();
//!
//! // ₹200.00 + 5% tax
//! assert_eq!(order.totals().grand_total.paise(), 21_000);
//!
//! order.add_payment(PaymentMethod::Cash, Money::from_paise(21_000), None).unwrap();
//! order.complete_payment(chrono::Utc::now()).unwrap();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod pricing;
pub mod report;
pub mod settlement;
pub mod support;
pub mod table;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bill::{BillCalculator, BillTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{KitchenTicket, NewOrderItem, Order, OrderItem, OrderNumber};
pub use payment::PaymentCollector;
pub use pricing::{PricingPolicy, RoundingMode};
pub use settlement::{OrderState, SettlementEvent};
pub use table::{Table, TableOrderSummary, TableStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID for single-tenant deployments.
///
/// The schema carries `tenant_id` everywhere; this is the value used
/// until tenant resolution arrives.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum lines on a single order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches typos like 100 instead of 10 at the pass.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest menu, variant or modifier price: ₹10,00,000.
pub const MAX_UNIT_PRICE: Money = Money::from_paise(100_000_000);

/// Highest subtotal a single order may reach: ₹10,00,00,000.
pub const MAX_ORDER_SUBTOTAL: Money = Money::from_paise(10_000_000_000);
