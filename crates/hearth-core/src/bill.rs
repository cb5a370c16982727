//! # Bill Calculator
//!
//! Turns order lines, a discount and a pricing policy into bill totals.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal        = Σ line totals                                        │
//! │  discount        = % of subtotal or fixed, clamped to [0, subtotal]     │
//! │  base            = subtotal − discount                                  │
//! │  service charge  = base × service rate     (order types in policy)      │
//! │  taxable         = base + service charge   (or base only, per policy)   │
//! │  tax             = taxable × tax rate      (exclusive, added)           │
//! │                  = taxable × r / (1 + r)   (inclusive, backed out)      │
//! │  grand total     = round(base + service charge [+ tax])                 │
//! │  rounding        = grand total − unrounded total                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Worked example: 2 × ₹420 with 10% off, dine-in, default policy.
//! ```text
//! subtotal 840.00 → discount 84.00 → base 756.00
//! service 37.80 → taxable 793.80 → tax 39.69
//! unrounded 833.49 → grand total 833.00 (rounding −0.49)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::PricingPolicy;
use crate::types::{Discount, OrderType};

// =============================================================================
// Bill Totals
// =============================================================================

/// Derived totals of an order. Never edited directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub service_charge: Money,
    pub taxable_amount: Money,
    pub tax: Money,
    /// Adjustment applied by rounding. May be negative.
    pub rounding: Money,
    pub grand_total: Money,
}

impl BillTotals {
    /// Net of discount, before service charge and tax.
    pub fn net_amount(&self) -> Money {
        self.subtotal - self.discount_amount
    }
}

// =============================================================================
// Bill Calculator
// =============================================================================

/// Stateless bill calculator.
pub struct BillCalculator;

impl BillCalculator {
    /// Calculates totals for the given line totals.
    ///
    /// Deterministic: the same inputs always produce the same totals.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::bill::BillCalculator;
    /// use hearth_core::pricing::PricingPolicy;
    /// use hearth_core::{Discount, Money, OrderType, Rate};
    ///
    /// let totals = BillCalculator::calculate(
    ///     [Money::from_paise(84_000)],
    ///     Some(&Discount::Percentage(Rate::from_bps(1_000))),
    ///     OrderType::DineIn,
    ///     &PricingPolicy::default(),
    /// );
    /// assert_eq!(totals.grand_total.paise(), 83_300);
    /// ```
    pub fn calculate<I>(
        line_totals: I,
        discount: Option<&Discount>,
        order_type: OrderType,
        policy: &PricingPolicy,
    ) -> BillTotals
    where
        I: IntoIterator<Item = Money>,
    {
        let subtotal: Money = line_totals.into_iter().sum();
        if subtotal.is_zero() {
            return BillTotals::default();
        }

        let discount_amount = discount
            .map(|d| d.amount_on(subtotal))
            .unwrap_or_else(Money::zero);
        let base = subtotal - discount_amount;

        let service_charge = if policy.applies_service_charge(order_type) {
            base.percent_of(policy.service_charge_rate)
        } else {
            Money::zero()
        };

        let taxable_amount = if policy.tax_on_service_charge {
            base + service_charge
        } else {
            base
        };

        let (tax, unrounded) = if policy.tax_inclusive {
            (
                taxable_amount.included_tax(policy.tax_rate),
                base + service_charge,
            )
        } else {
            let tax = taxable_amount.percent_of(policy.tax_rate);
            (tax, base + service_charge + tax)
        };

        let grand_total = policy.rounding.apply(unrounded);

        BillTotals {
            subtotal,
            discount_amount,
            service_charge,
            taxable_amount,
            tax,
            rounding: grand_total - unrounded,
            grand_total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
