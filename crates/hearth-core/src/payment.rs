//! # Payment Collector
//!
//! Collects one or more tenders against an order's balance and settles it.
//!
//! ## Split Tender Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  balance due ₹500                                                       │
//! │      │                                                                  │
//! │      ├── add cash ₹300 ─────────────► balance ₹200                      │
//! │      │                                                                  │
//! │      ├── add upi ₹250 (clamped ₹200) ► balance ₹0                       │
//! │      │                                                                  │
//! │      └── complete ─────────────────► order settled, payment paid        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The collector lives on the order between requests, so each tender can
//! arrive as its own API call. Until `complete` succeeds, tenders are
//! provisional and can be removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::Order;
use crate::types::{Payment, PaymentMethod};
use crate::validation::validate_payment_amount;

/// An in-progress tender session for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCollector {
    order_id: String,
    /// Grand total of the order, refreshed whenever it is recalculated.
    grand_total: Money,
    /// Confirmed payments from earlier sessions.
    previously_paid: Money,
    payments: Vec<Payment>,
}

impl PaymentCollector {
    pub fn new(order_id: impl Into<String>, grand_total: Money, previously_paid: Money) -> Self {
        Self {
            order_id: order_id.into(),
            grand_total,
            previously_paid,
            payments: Vec::new(),
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Sum of the tenders in this session.
    pub fn tendered(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// `grand_total − previously_paid − tendered`, never negative.
    pub fn balance_due(&self) -> Money {
        (self.grand_total - self.previously_paid - self.tendered()).max(Money::zero())
    }

    pub(crate) fn set_grand_total(&mut self, grand_total: Money) {
        self.grand_total = grand_total;
    }

    /// Adds a tender, clamped to the remaining balance.
    ///
    /// ## Errors
    /// - `Validation` when `amount ≤ 0`
    /// - `InvalidPaymentAmount` when nothing is left to collect
    pub fn add_payment(
        &mut self,
        method: PaymentMethod,
        amount: Money,
        reference: Option<String>,
    ) -> CoreResult<&Payment> {
        validate_payment_amount(amount)?;

        let applied = amount.min(self.balance_due());
        if !applied.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "nothing left to collect on this order".to_string(),
            });
        }

        self.payments.push(Payment {
            id: Uuid::new_v4().to_string(),
            order_id: self.order_id.clone(),
            method,
            amount: applied,
            reference,
            created_at: Utc::now(),
        });

        let index = self.payments.len() - 1;
        Ok(&self.payments[index])
    }

    /// Removes a provisional tender.
    pub fn remove_payment(&mut self, payment_id: &str) -> CoreResult<Payment> {
        let index = self
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or_else(|| CoreError::PaymentNotFound(payment_id.to_string()))?;

        Ok(self.payments.remove(index))
    }

    /// Settles `order` with the tendered payments.
    ///
    /// Requires at least one tender and a zero balance. On success the
    /// tenders move into the order's payment history.
    pub fn complete(&self, order: &mut Order, now: DateTime<Utc>) -> CoreResult<()> {
        if self.payments.is_empty() {
            return Err(CoreError::NoPayments);
        }

        let balance_due = self.balance_due();
        if balance_due.is_positive() {
            return Err(CoreError::InsufficientPayment {
                paid: self.previously_paid + self.tendered(),
                grand_total: self.grand_total,
                balance_due,
            });
        }

        order.record_settlement(self.payments.clone(), now)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(due: i64) -> PaymentCollector {
        PaymentCollector::new("order-1", Money::from_paise(due), Money::zero())
    }

    #[test]
    fn test_split_tender_clamps_to_balance() {
        let mut c = collector(50_000);

        c.add_payment(PaymentMethod::Cash, Money::from_paise(30_000), None)
            .unwrap();
        assert_eq!(c.balance_due().paise(), 20_000);

        let upi = c
            .add_payment(PaymentMethod::Upi, Money::from_paise(25_000), Some("UPI-77".into()))
            .unwrap();
        assert_eq!(upi.amount.paise(), 20_000);
        assert_eq!(upi.order_id, "order-1");
        assert!(c.balance_due().is_zero());
        assert_eq!(c.tendered().paise(), 50_000);
    }

    #[test]
    fn test_payment_on_zero_balance_is_rejected() {
        let mut c = collector(0);
        let err = c
            .add_payment(PaymentMethod::Cash, Money::from_paise(10_000), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPaymentAmount { .. }));
        assert!(c.is_empty());
    }

    #[test]
    fn test_non_positive_amount_is_rejected() {
        let mut c = collector(10_000);
        assert!(matches!(
            c.add_payment(PaymentMethod::Card, Money::zero(), None),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            c.add_payment(PaymentMethod::Card, Money::from_paise(-500), None),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_payment_restores_balance() {
        let mut c = collector(40_000);
        let id = c
            .add_payment(PaymentMethod::Card, Money::from_paise(15_000), None)
            .unwrap()
            .id
            .clone();

        let removed = c.remove_payment(&id).unwrap();
        assert_eq!(removed.amount.paise(), 15_000);
        assert_eq!(c.balance_due().paise(), 40_000);
        assert!(matches!(
            c.remove_payment(&id),
            Err(CoreError::PaymentNotFound(_))
        ));
    }

    #[test]
    fn test_balance_never_negative_and_monotonic() {
        let mut c = PaymentCollector::new("o", Money::from_paise(10_000), Money::from_paise(4_000));
        assert_eq!(c.balance_due().paise(), 6_000);

        let mut last = c.balance_due();
        for amount in [1_000, 2_500, 9_000] {
            c.add_payment(PaymentMethod::Cash, Money::from_paise(amount), None)
                .unwrap();
            assert!(c.balance_due() <= last);
            assert!(!c.balance_due().is_negative());
            last = c.balance_due();
        }
        assert!(c.balance_due().is_zero());
    }

    #[test]
    fn test_lower_grand_total_keeps_balance_non_negative() {
        let mut c = collector(20_000);
        c.add_payment(PaymentMethod::Cash, Money::from_paise(20_000), None)
            .unwrap();
        c.set_grand_total(Money::from_paise(15_000));
        assert!(c.balance_due().is_zero());
    }
}
