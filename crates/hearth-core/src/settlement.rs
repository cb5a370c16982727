//! # Settlement State Machine
//!
//! The lifecycle of an order from first item to settlement.
//!
//! ## States
//! ```text
//!              generate_kot             print_bill
//!   ┌────────┐ ───────────► ┌──────────┐ ─────────► ┌────────┐
//!   │ active │              │ kot-sent │            │ billed │ ◄─┐ print_bill
//!   └───┬────┘              └──┬───┬───┘            └───┬────┘ ──┘ (reprint)
//!       │                      │   └─◄─ generate_kot    │
//!       │                      │      (new items only)  │
//!       │       complete_payment (paid ≥ grand total)   │
//!       ├──────────────────────┴──────────┬─────────────┤
//!       │                                 ▼             │
//!       │                           ┌──────────┐        │
//!       │                           │ settled  │        │
//!       │                           └──────────┘        │
//!       │                void                           │
//!       └──────────────────────┬────────────────────────┘
//!                              ▼
//!                          ┌──────┐
//!                          │ void │
//!                          └──────┘
//! ```
//!
//! `Settled` can only be built by [`OrderState::complete_payment`], which
//! refuses while any balance is due. Settled therefore always means paid.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::OrderStatus;

// =============================================================================
// Events
// =============================================================================

/// Something the cashier does that moves an order along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementEvent {
    GenerateKot,
    PrintBill,
    CompletePayment,
    Void,
}

impl SettlementEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementEvent::GenerateKot => "generate-kot",
            SettlementEvent::PrintBill => "print-bill",
            SettlementEvent::CompletePayment => "complete-payment",
            SettlementEvent::Void => "void",
        }
    }
}

/// Renders as a verb phrase for error messages.
impl fmt::Display for SettlementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            SettlementEvent::GenerateKot => "send a KOT for",
            SettlementEvent::PrintBill => "print a bill for",
            SettlementEvent::CompletePayment => "settle",
            SettlementEvent::Void => "void",
        };
        f.write_str(verb)
    }
}

// =============================================================================
// Order State
// =============================================================================

/// Authoritative order lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OrderState {
    Active,
    KotSent,
    Billed,
    Settled {
        #[serde(rename = "settledAt")]
        #[ts(as = "String")]
        settled_at: DateTime<Utc>,
    },
    Void {
        reason: String,
        #[serde(rename = "voidedAt")]
        #[ts(as = "String")]
        voided_at: DateTime<Utc>,
    },
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState::Active
    }
}

impl OrderState {
    /// Flat status for display and the `orders.status` column.
    pub fn status(&self) -> OrderStatus {
        match self {
            OrderState::Active => OrderStatus::Active,
            OrderState::KotSent => OrderStatus::KotSent,
            OrderState::Billed => OrderStatus::Billed,
            OrderState::Settled { .. } => OrderStatus::Settled,
            OrderState::Void { .. } => OrderStatus::Void,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Whether items may be added, changed or removed.
    pub fn allows_item_edits(&self) -> bool {
        matches!(self, OrderState::Active | OrderState::KotSent)
    }

    /// Whether the discount or no-charge flag may change.
    pub fn allows_discount_edits(&self) -> bool {
        !self.is_terminal()
    }

    /// Transition table, ignoring guards.
    pub fn permits(&self, event: SettlementEvent) -> bool {
        use SettlementEvent::*;

        match self {
            OrderState::Active => matches!(event, GenerateKot | CompletePayment | Void),
            OrderState::KotSent => true,
            OrderState::Billed => matches!(event, PrintBill | CompletePayment | Void),
            OrderState::Settled { .. } | OrderState::Void { .. } => false,
        }
    }

    fn ensure(&self, event: SettlementEvent) -> CoreResult<()> {
        if self.permits(event) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self.status(),
                event,
            })
        }
    }

    /// `active → kot-sent` and `kot-sent → kot-sent`.
    ///
    /// `item_count` and `pending_count` are the order's line count and the
    /// number of lines with quantities not yet sent to the kitchen.
    pub fn generate_kot(
        &self,
        order_number: &str,
        item_count: usize,
        pending_count: usize,
    ) -> CoreResult<OrderState> {
        self.ensure(SettlementEvent::GenerateKot)?;

        if item_count == 0 {
            return Err(CoreError::EmptyOrder {
                order_number: order_number.to_string(),
            });
        }
        if pending_count == 0 {
            return Err(CoreError::NoPendingItems {
                order_number: order_number.to_string(),
            });
        }

        Ok(OrderState::KotSent)
    }

    /// `kot-sent → billed`, or a reprint while already billed.
    pub fn print_bill(&self) -> CoreResult<OrderState> {
        self.ensure(SettlementEvent::PrintBill)?;
        Ok(OrderState::Billed)
    }

    /// Settles the order once `paid` covers `grand_total`.
    pub fn complete_payment(
        &self,
        paid: Money,
        grand_total: Money,
        now: DateTime<Utc>,
    ) -> CoreResult<OrderState> {
        self.ensure(SettlementEvent::CompletePayment)?;

        if paid < grand_total {
            return Err(CoreError::InsufficientPayment {
                paid,
                grand_total,
                balance_due: grand_total - paid,
            });
        }

        Ok(OrderState::Settled { settled_at: now })
    }

    /// Cancels a non-terminal order.
    pub fn void(&self, reason: String, now: DateTime<Utc>) -> CoreResult<OrderState> {
        self.ensure(SettlementEvent::Void)?;
        Ok(OrderState::Void {
            reason,
            voided_at: now,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
