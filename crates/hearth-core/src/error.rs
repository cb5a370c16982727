//! # Error Types
//!
//! Domain-specific error types for hearth-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hearth-core errors (this file)                                        │
//! │  ├── CoreError        - Billing / settlement rule violations           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  hearth-db errors (separate crate)                                     │
//! │  └── DbError          - Persistence failures, version conflicts        │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What the front-end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Front-end    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is a local, recoverable rejection of one UI action.
//! Nothing in this crate panics on bad input.

use thiserror::Error;

use crate::money::Money;
use crate::settlement::SettlementEvent;
use crate::table::TableStatus;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Billing and settlement errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Discount is negative, above 100%, or otherwise malformed.
    #[error("Invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// Settlement attempted before the balance is covered.
    ///
    /// ## User Workflow
    /// ```text
    /// Grand total ₹500, tendered ₹300
    ///      │
    ///      ▼
    /// complete()  ──►  InsufficientPayment { balance_due: ₹200 }
    ///      │
    ///      ▼
    /// UI keeps the "Complete" button disabled
    /// ```
    #[error("Insufficient payment: {paid} received against {grand_total}, {balance_due} still due")]
    InsufficientPayment {
        paid: Money,
        grand_total: Money,
        balance_due: Money,
    },

    /// A state-machine event was raised from a terminal or incompatible state.
    #[error("Cannot {event} an order that is {from}")]
    InvalidTransition {
        from: OrderStatus,
        event: SettlementEvent,
    },

    /// Item quantity driven below zero.
    #[error("Quantity for item {item_id} cannot be negative (requested {requested})")]
    NegativeQuantity { item_id: String, requested: i64 },

    /// KOT requested for an order with no items.
    #[error("Order {order_number} has no items")]
    EmptyOrder { order_number: String },

    /// KOT requested but every quantity is already with the kitchen.
    #[error("Order {order_number} has no items waiting for the kitchen")]
    NoPendingItems { order_number: String },

    /// Items can no longer be edited in the current state.
    #[error("Order {order_number} is {status} and can no longer be modified")]
    OrderLocked {
        order_number: String,
        status: OrderStatus,
    },

    /// Edits are blocked while a tender session holds payments.
    #[error("Order {order_number} has payments in progress; remove them before editing")]
    PaymentInProgress { order_number: String },

    /// Completion attempted without any tendered payment.
    #[error("No payments have been recorded")]
    NoPayments,

    #[error("Order item not found: {0}")]
    ItemNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Payment amount is invalid (non-positive, or nothing left to collect).
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Order has exceeded the maximum number of lines.
    #[error("Order cannot have more than {max} lines")]
    OrderTooLarge { max: usize },

    /// A line or the order subtotal would exceed its ceiling.
    #[error("Order amount exceeds maximum allowed ({max})")]
    AmountTooLarge { max: Money },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Table cannot take a new order.
    #[error("Table {table} is {status}")]
    TableUnavailable { table: u32, status: TableStatus },

    /// Table lifecycle move not allowed from the current status.
    #[error("Cannot {action} table {table} while it is {from}")]
    InvalidTableTransition {
        table: u32,
        from: TableStatus,
        action: &'static str,
    },

    #[error("Support session not found: {0}")]
    SupportSessionNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business rule runs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid order number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientPayment {
            paid: Money::from_paise(30_000),
            grand_total: Money::from_paise(50_000),
            balance_due: Money::from_paise(20_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: ₹300.00 received against ₹500.00, ₹200.00 still due"
        );

        let err = CoreError::InvalidTransition {
            from: OrderStatus::Settled,
            event: SettlementEvent::Void,
        };
        assert_eq!(err.to_string(), "Cannot void an order that is settled");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
