//! # Daily Sales Summary
//!
//! End-of-day figures built from one business day's orders. Only settled
//! orders contribute money; open and void orders are counted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::order::Order;
use crate::types::{OrderStatus, OrderType, PaymentMethod};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub count: u32,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTypeTotal {
    pub order_type: OrderType,
    pub count: u32,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_orders: u32,
    pub settled_orders: u32,
    pub open_orders: u32,
    pub void_orders: u32,
    pub no_charge_orders: u32,
    /// Σ subtotal of settled orders.
    pub gross_sales: Money,
    pub discounts: Money,
    pub service_charge: Money,
    pub tax: Money,
    pub rounding: Money,
    /// Σ grand total of settled orders.
    pub net_sales: Money,
    pub collected: Money,
    pub average_ticket: Money,
    pub by_method: Vec<MethodTotal>,
    pub by_order_type: Vec<OrderTypeTotal>,
}

impl SalesSummary {
    pub fn from_orders<'a, I>(date: NaiveDate, orders: I) -> Self
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut summary = SalesSummary {
            date,
            total_orders: 0,
            settled_orders: 0,
            open_orders: 0,
            void_orders: 0,
            no_charge_orders: 0,
            gross_sales: Money::zero(),
            discounts: Money::zero(),
            service_charge: Money::zero(),
            tax: Money::zero(),
            rounding: Money::zero(),
            net_sales: Money::zero(),
            collected: Money::zero(),
            average_ticket: Money::zero(),
            by_method: Vec::new(),
            by_order_type: Vec::new(),
        };
        let mut methods: BTreeMap<PaymentMethod, (u32, Money)> = BTreeMap::new();
        let mut types: BTreeMap<OrderType, (u32, Money)> = BTreeMap::new();

        for order in orders {
            summary.total_orders += 1;
            match order.status() {
                OrderStatus::Void => {
                    summary.void_orders += 1;
                    continue;
                }
                OrderStatus::Settled => summary.settled_orders += 1,
                _ => {
                    summary.open_orders += 1;
                    continue;
                }
            }

            let totals = order.totals();
            if order.no_charge_reason().is_some() {
                summary.no_charge_orders += 1;
            }
            summary.gross_sales += totals.subtotal;
            summary.discounts += totals.discount_amount;
            summary.service_charge += totals.service_charge;
            summary.tax += totals.tax;
            summary.rounding += totals.rounding;
            summary.net_sales += totals.grand_total;
            summary.collected += order.paid();

            let entry = types.entry(order.order_type).or_default();
            entry.0 += 1;
            entry.1 += totals.grand_total;

            for payment in order.payments() {
                let entry = methods.entry(payment.method).or_default();
                entry.0 += 1;
                entry.1 += payment.amount;
            }
        }

        if summary.settled_orders > 0 {
            let count = summary.settled_orders as i64;
            summary.average_ticket = Money::from_paise(
                (summary.net_sales.paise() + count / 2) / count,
            );
        }

        summary.by_method = methods
            .into_iter()
            .map(|(method, (count, amount))| MethodTotal {
                method,
                count,
                amount,
            })
            .collect();
        summary.by_order_type = types
            .into_iter()
            .map(|(order_type, (count, amount))| OrderTypeTotal {
                order_type,
                count,
                amount,
            })
            .collect();

        summary
    }
}
