//! # Order Aggregate
//!
//! The order is the unit of billing: its lines, its discount, its frozen
//! pricing policy, its derived totals and its settlement state.
//!
//! ## Lifecycle of an Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order::new ──► add_item / set_quantity / apply_discount                │
//! │                       │ (totals recalculated after every change)        │
//! │                       ▼                                                 │
//! │                 generate_kot ──► KitchenTicket (unsent quantities)      │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │                  print_bill                                             │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │        add_payment ... add_payment ──► complete_payment                 │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                          settled                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never written from outside; every mutation ends in
//! [`Order::recalculate`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::bill::{BillCalculator, BillTotals};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::PaymentCollector;
use crate::pricing::PricingPolicy;
use crate::settlement::{OrderState, SettlementEvent};
use crate::types::{
    Discount, MenuItemRef, Modifier, OrderStatus, OrderType, Payment, PaymentMethod,
    PaymentStatus, Portion, Rate, Variant,
};
use crate::validation::{
    validate_discount, validate_item_name, validate_optional_text, validate_order_number,
    validate_order_size, validate_price, validate_quantity, validate_reason, ValidationResult,
};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_SUBTOTAL};

// =============================================================================
// Order Number
// =============================================================================

/// Human-facing order number, `ORD-DDMM-NNNN`.
///
/// `NNNN` is the sequence within the business day, zero-padded to four
/// digits (it simply grows wider past 9999).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use hearth_core::order::OrderNumber;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// assert_eq!(OrderNumber::new(date, 42).as_str(), "ORD-1503-0042");
    /// ```
    pub fn new(business_date: NaiveDate, sequence: u32) -> Self {
        OrderNumber(format!(
            "ORD-{:02}{:02}-{:04}",
            business_date.day(),
            business_date.month(),
            sequence
        ))
    }

    pub fn parse(value: &str) -> ValidationResult<Self> {
        validate_order_number(value)?;
        Ok(OrderNumber(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// What the cashier picks from the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub menu_item: MenuItemRef,
    #[serde(default)]
    pub variant: Option<Variant>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewOrderItem {
    pub fn new(menu_item: MenuItemRef, quantity: i64) -> Self {
        Self {
            menu_item,
            variant: None,
            modifiers: Vec::new(),
            quantity,
            note: None,
        }
    }
}

/// One line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub menu_item: MenuItemRef,
    pub variant: Option<Variant>,
    pub modifiers: Vec<Modifier>,
    pub quantity: i64,
    /// Quantity already printed on a KOT.
    pub sent_quantity: i64,
    pub note: Option<String>,
    /// Resolved when the line is added.
    pub unit_price: Money,
    pub line_total: Money,
}

impl OrderItem {
    fn from_new(item: NewOrderItem, order_type: OrderType) -> CoreResult<Self> {
        let unit_price = match (&item.variant, item.menu_item.takeaway_price) {
            (Some(variant), _) => variant.price,
            (None, Some(takeaway)) if order_type.uses_takeaway_price() => takeaway,
            _ => item.menu_item.price,
        };

        let mut line = OrderItem {
            id: Uuid::new_v4().to_string(),
            menu_item: item.menu_item,
            variant: item.variant,
            modifiers: item.modifiers,
            quantity: item.quantity,
            sent_quantity: 0,
            note: item.note,
            unit_price,
            line_total: Money::zero(),
        };
        line.refresh_total()?;
        Ok(line)
    }

    /// Sum of modifier prices for one unit.
    pub fn modifier_unit_total(&self) -> Money {
        self.modifiers.iter().map(|m| m.price).sum()
    }

    /// Quantity still to be sent to the kitchen.
    pub fn pending_quantity(&self) -> i64 {
        (self.quantity - self.sent_quantity).max(0)
    }

    /// Recomputes `line_total`, rejecting amounts past the order ceiling.
    fn refresh_total(&mut self) -> CoreResult<()> {
        let too_large = || CoreError::AmountTooLarge {
            max: MAX_ORDER_SUBTOTAL,
        };
        let unit = self
            .modifiers
            .iter()
            .try_fold(self.unit_price, |acc, m| acc.checked_add(m.price))
            .ok_or_else(too_large)?;
        let total = unit.checked_mul(self.quantity).ok_or_else(too_large)?;
        if total > MAX_ORDER_SUBTOTAL {
            return Err(too_large());
        }

        self.line_total = total;
        self.sent_quantity = self.sent_quantity.min(self.quantity);
        Ok(())
    }

    fn modifier_ids(modifiers: &[Modifier]) -> BTreeSet<&str> {
        modifiers.iter().map(|m| m.id.as_str()).collect()
    }

    /// Same dish, portion, modifier set and note.
    fn matches(&self, item: &NewOrderItem) -> bool {
        self.menu_item.id == item.menu_item.id
            && self.variant.map(|v| v.portion) == item.variant.map(|v| v.portion)
            && self.note == item.note
            && Self::modifier_ids(&self.modifiers) == Self::modifier_ids(&item.modifiers)
    }
}

// =============================================================================
// Kitchen Order Ticket
// =============================================================================

/// One line on a KOT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicketLine {
    pub item_id: String,
    pub name: String,
    pub portion: Option<Portion>,
    pub modifiers: Vec<String>,
    pub quantity: i64,
    pub note: Option<String>,
}

/// Ticket sent to the kitchen listing only quantities not yet sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicket {
    pub kot_number: u32,
    pub order_id: String,
    pub order_number: OrderNumber,
    pub table_number: Option<u32>,
    pub order_type: OrderType,
    pub lines: Vec<KitchenTicketLine>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: OrderNumber,
    pub order_type: OrderType,
    pub table_id: Option<String>,
    pub table_number: Option<u32>,
    items: Vec<OrderItem>,
    discount: Option<Discount>,
    /// Reason the bill is complimentary (NC bill).
    no_charge: Option<String>,
    policy: PricingPolicy,
    totals: BillTotals,
    state: OrderState,
    /// Confirmed amount received.
    paid: Money,
    payments: Vec<Payment>,
    collection: Option<PaymentCollector>,
    kot_count: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Optimistic lock, bumped by the repository on every write.
    #[serde(default)]
    pub version: i64,
}

impl Order {
    /// Opens an empty order with a snapshot of `policy`.
    pub fn new(order_number: OrderNumber, order_type: OrderType, policy: PricingPolicy) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            order_number,
            order_type,
            table_id: None,
            table_number: None,
            items: Vec::new(),
            discount: None,
            no_charge: None,
            policy,
            totals: BillTotals::default(),
            state: OrderState::Active,
            paid: Money::zero(),
            payments: Vec::new(),
            collection: None,
            kot_count: 0,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Attaches the order to a dining table.
    pub fn with_table(mut self, table_id: impl Into<String>, table_number: u32) -> Self {
        self.table_id = Some(table_id.into());
        self.table_number = Some(table_number);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn no_charge_reason(&self) -> Option<&str> {
        self.no_charge.as_deref()
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn totals(&self) -> &BillTotals {
        &self.totals
    }

    pub fn state(&self) -> &OrderState {
        &self.state
    }

    pub fn status(&self) -> OrderStatus {
        self.state.status()
    }

    pub fn paid(&self) -> Money {
        self.paid
    }

    /// Confirmed payment history.
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Open tender session, if any.
    pub fn collection(&self) -> Option<&PaymentCollector> {
        self.collection.as_ref()
    }

    pub fn kot_count(&self) -> u32 {
        self.kot_count
    }

    /// Provisional tenders in the open session.
    pub fn tendered(&self) -> Money {
        self.collection
            .as_ref()
            .map(PaymentCollector::tendered)
            .unwrap_or_else(Money::zero)
    }

    pub fn balance_due(&self) -> Money {
        match &self.collection {
            Some(collector) => collector.balance_due(),
            None => (self.totals.grand_total - self.paid).max(Money::zero()),
        }
    }

    /// Settled orders are always paid; otherwise derived from money received.
    pub fn payment_status(&self) -> PaymentStatus {
        match self.state {
            OrderState::Settled { .. } => PaymentStatus::Paid,
            _ => PaymentStatus::from_amounts(self.paid + self.tendered(), self.totals.grand_total),
        }
    }

    /// Calendar date of the order in UTC.
    pub fn business_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Short labels for the table card, e.g. `"2× Paneer Tikka"`.
    pub fn item_labels(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|i| format!("{}× {}", i.quantity, i.menu_item.name))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Item Editing
    // -------------------------------------------------------------------------

    /// Adds a line, or bumps the quantity of an identical line.
    pub fn add_item(&mut self, item: NewOrderItem) -> CoreResult<&OrderItem> {
        self.ensure_items_editable()?;

        validate_item_name(&item.menu_item.name)?;
        validate_price("price", item.menu_item.price)?;
        if let Some(takeaway) = item.menu_item.takeaway_price {
            validate_price("takeaway price", takeaway)?;
        }
        if let Some(variant) = &item.variant {
            validate_price("variant price", variant.price)?;
        }
        for modifier in &item.modifiers {
            validate_price("modifier price", modifier.price)?;
        }
        validate_quantity(item.quantity)?;
        let note = validate_optional_text("note", item.note.as_deref())?;
        let item = NewOrderItem { note, ..item };

        let index = match self.items.iter().position(|line| line.matches(&item)) {
            Some(index) => {
                let requested = self.items[index].quantity + item.quantity;
                Self::check_quantity_limit(requested)?;
                let mut line = self.items[index].clone();
                line.quantity = requested;
                line.refresh_total()?;
                self.check_subtotal(Some(index), &line)?;
                self.items[index] = line;
                index
            }
            None => {
                validate_order_size(self.items.len()).map_err(|_| CoreError::OrderTooLarge {
                    max: crate::MAX_ORDER_LINES,
                })?;
                let line = OrderItem::from_new(item, self.order_type)?;
                self.check_subtotal(None, &line)?;
                self.items.push(line);
                self.items.len() - 1
            }
        };

        self.recalculate();
        Ok(&self.items[index])
    }

    pub fn increment_item(&mut self, item_id: &str) -> CoreResult<()> {
        let quantity = self.find_item(item_id)?.quantity + 1;
        self.set_quantity(item_id, quantity)
    }

    /// Decrements by one; reaching zero removes the line.
    pub fn decrement_item(&mut self, item_id: &str) -> CoreResult<()> {
        let quantity = self.find_item(item_id)?.quantity - 1;
        self.set_quantity(item_id, quantity)
    }

    /// Sets an absolute quantity. Zero removes the line.
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        self.ensure_items_editable()?;
        self.find_item(item_id)?;

        if quantity < 0 {
            return Err(CoreError::NegativeQuantity {
                item_id: item_id.to_string(),
                requested: quantity,
            });
        }
        if quantity == 0 {
            return self.remove_item(item_id);
        }
        Self::check_quantity_limit(quantity)?;

        if let Some(index) = self.items.iter().position(|i| i.id == item_id) {
            let mut line = self.items[index].clone();
            line.quantity = quantity;
            line.refresh_total()?;
            self.check_subtotal(Some(index), &line)?;
            self.items[index] = line;
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        self.ensure_items_editable()?;
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before {
            return Err(CoreError::ItemNotFound(item_id.to_string()));
        }
        self.recalculate();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Discount / NC Bill
    // -------------------------------------------------------------------------

    pub fn apply_discount(&mut self, discount: Discount) -> CoreResult<()> {
        self.ensure_discount_editable()?;
        validate_discount(&discount).map_err(|e| CoreError::InvalidDiscount {
            reason: e.to_string(),
        })?;

        self.discount = Some(discount);
        self.recalculate();
        Ok(())
    }

    pub fn clear_discount(&mut self) -> CoreResult<()> {
        self.ensure_discount_editable()?;
        self.discount = None;
        self.recalculate();
        Ok(())
    }

    /// Makes the bill complimentary. Totals drop to zero.
    pub fn mark_no_charge(&mut self, reason: &str) -> CoreResult<()> {
        self.ensure_discount_editable()?;
        self.no_charge = Some(validate_reason("reason", reason)?);
        self.recalculate();
        Ok(())
    }

    pub fn clear_no_charge(&mut self) -> CoreResult<()> {
        self.ensure_discount_editable()?;
        self.no_charge = None;
        self.recalculate();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Settlement Events
    // -------------------------------------------------------------------------

    /// Sends unsent quantities to the kitchen.
    pub fn generate_kot(&mut self, now: DateTime<Utc>) -> CoreResult<KitchenTicket> {
        let pending = self.items.iter().filter(|i| i.pending_quantity() > 0).count();
        let next = self
            .state
            .generate_kot(self.order_number.as_str(), self.items.len(), pending)?;

        let lines = self
            .items
            .iter_mut()
            .filter(|i| i.pending_quantity() > 0)
            .map(|item| {
                let line = KitchenTicketLine {
                    item_id: item.id.clone(),
                    name: item.menu_item.name.clone(),
                    portion: item.variant.map(|v| v.portion),
                    modifiers: item.modifiers.iter().map(|m| m.name.clone()).collect(),
                    quantity: item.pending_quantity(),
                    note: item.note.clone(),
                };
                item.sent_quantity = item.quantity;
                line
            })
            .collect();

        self.kot_count += 1;
        self.state = next;
        self.updated_at = now;

        Ok(KitchenTicket {
            kot_number: self.kot_count,
            order_id: self.id.clone(),
            order_number: self.order_number.clone(),
            table_number: self.table_number,
            order_type: self.order_type,
            lines,
            created_at: now,
        })
    }

    /// Prints (or reprints) the bill.
    pub fn print_bill(&mut self) -> CoreResult<&BillTotals> {
        self.state = self.state.print_bill()?;
        self.touch();
        Ok(&self.totals)
    }

    /// Adds a tender to the open session, starting one if needed.
    pub fn add_payment(
        &mut self,
        method: PaymentMethod,
        amount: Money,
        reference: Option<String>,
    ) -> CoreResult<Payment> {
        self.ensure_can_settle()?;
        let reference = validate_optional_text("reference", reference.as_deref())?;

        let (id, grand_total, paid) = (self.id.clone(), self.totals.grand_total, self.paid);
        let collector = self
            .collection
            .get_or_insert_with(|| PaymentCollector::new(id, grand_total, paid));

        let result = collector.add_payment(method, amount, reference).cloned();
        if self.collection.as_ref().is_some_and(PaymentCollector::is_empty) {
            self.collection = None;
        }

        let payment = result?;
        self.touch();
        Ok(payment)
    }

    pub fn remove_payment(&mut self, payment_id: &str) -> CoreResult<Payment> {
        self.ensure_can_settle()?;
        let collector = self
            .collection
            .as_mut()
            .ok_or_else(|| CoreError::PaymentNotFound(payment_id.to_string()))?;

        let removed = collector.remove_payment(payment_id)?;
        if collector.is_empty() {
            self.collection = None;
        }
        self.touch();
        Ok(removed)
    }

    /// Settles the order with the open tender session.
    pub fn complete_payment(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_can_settle()?;
        let collector = self.collection.take().ok_or(CoreError::NoPayments)?;

        match collector.complete(self, now) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.collection = Some(collector);
                Err(err)
            }
        }
    }

    /// Settles a no-charge order without any tender.
    ///
    /// Only an order marked no-charge with at least one line qualifies;
    /// anything else settles through payments.
    pub fn settle_no_charge(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_can_settle()?;
        if self.collection.is_some() {
            return Err(CoreError::PaymentInProgress {
                order_number: self.order_number.to_string(),
            });
        }
        if self.no_charge.is_none() {
            return Err(CoreError::NoPayments);
        }
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder {
                order_number: self.order_number.to_string(),
            });
        }
        self.record_settlement(Vec::new(), now)
    }

    /// Cancels the order. Provisional tenders are discarded.
    pub fn void(&mut self, reason: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let reason = validate_reason("reason", reason)?;
        self.state = self.state.void(reason, now)?;
        self.collection = None;
        self.updated_at = now;
        Ok(())
    }

    /// Moves `payments` into the history and settles through the state machine.
    pub(crate) fn record_settlement(
        &mut self,
        payments: Vec<Payment>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        let received: Money = payments.iter().map(|p| p.amount).sum();
        let paid = self.paid + received;

        self.state = self
            .state
            .complete_payment(paid, self.totals.grand_total, now)?;
        self.paid = paid;
        self.payments.extend(payments);
        self.updated_at = now;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Recomputes totals from lines, discount and the frozen policy.
    pub fn recalculate(&mut self) {
        let discount = if self.no_charge.is_some() {
            Some(Discount::Percentage(Rate::full()))
        } else {
            self.discount
        };

        self.totals = BillCalculator::calculate(
            self.items.iter().map(|i| i.line_total),
            discount.as_ref(),
            self.order_type,
            &self.policy,
        );

        if let Some(collector) = self.collection.as_mut() {
            collector.set_grand_total(self.totals.grand_total);
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Fails if the order subtotal would pass [`MAX_ORDER_SUBTOTAL`] with
    /// `line` in place of the line at `replacing` (or appended).
    fn check_subtotal(&self, replacing: Option<usize>, line: &OrderItem) -> CoreResult<()> {
        let too_large = || CoreError::AmountTooLarge {
            max: MAX_ORDER_SUBTOTAL,
        };
        let subtotal = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replacing)
            .try_fold(line.line_total, |acc, (_, l)| acc.checked_add(l.line_total))
            .ok_or_else(too_large)?;
        if subtotal > MAX_ORDER_SUBTOTAL {
            return Err(too_large());
        }
        Ok(())
    }

    fn find_item(&self, item_id: &str) -> CoreResult<&OrderItem> {
        self.item(item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))
    }

    fn check_quantity_limit(requested: i64) -> CoreResult<()> {
        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }
        Ok(())
    }

    fn ensure_no_open_tenders(&self) -> CoreResult<()> {
        if self.collection.as_ref().is_some_and(|c| !c.is_empty()) {
            return Err(CoreError::PaymentInProgress {
                order_number: self.order_number.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_items_editable(&self) -> CoreResult<()> {
        if !self.state.allows_item_edits() {
            return Err(CoreError::OrderLocked {
                order_number: self.order_number.to_string(),
                status: self.status(),
            });
        }
        self.ensure_no_open_tenders()
    }

    fn ensure_discount_editable(&self) -> CoreResult<()> {
        if !self.state.allows_discount_edits() {
            return Err(CoreError::OrderLocked {
                order_number: self.order_number.to_string(),
                status: self.status(),
            });
        }
        self.ensure_no_open_tenders()
    }

    fn ensure_can_settle(&self) -> CoreResult<()> {
        if !self.state.permits(SettlementEvent::CompletePayment) {
            return Err(CoreError::InvalidTransition {
                from: self.status(),
                event: SettlementEvent::CompletePayment,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(id: &str, name: &str, paise: i64) -> MenuItemRef {
        MenuItemRef {
            id: id.to_string(),
            name: name.to_string(),
            price: Money::from_paise(paise),
            takeaway_price: None,
        }
    }

    fn order_number() -> OrderNumber {
        OrderNumber::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 1)
    }

    fn dine_in() -> Order {
        Order::new(order_number(), OrderType::DineIn, PricingPolicy::default()).with_table("t-1", 4)
    }

    fn order_with_grand_total_500() -> Order {
        // Takeaway, no service charge: 476.19 + 5% ≈ 500.00
        let mut order = Order::new(order_number(), OrderType::Takeaway, PricingPolicy::default());
        order
            .add_item(NewOrderItem::new(menu("m-1", "Thali", 47_619), 1))
            .unwrap();
        assert_eq!(order.totals().grand_total.paise(), 50_000);
        order
    }

    #[test]
    fn test_order_number_format() {
        assert_eq!(order_number().as_str(), "ORD-1503-0001");
        assert!(OrderNumber::parse("ORD-1503-0001").is_ok());
        assert!(OrderNumber::parse("1503-0001").is_err());
    }

    #[test]
    fn test_scenario_bill_with_discount() {
        let mut order = dine_in();
        order
            .add_item(NewOrderItem::new(menu("m-1", "Paneer Tikka", 42_000), 2))
            .unwrap();
        order
            .apply_discount(Discount::Percentage(Rate::from_bps(1_000)))
            .unwrap();

        let totals = order.totals();
        assert_eq!(totals.subtotal.paise(), 84_000);
        assert_eq!(totals.discount_amount.paise(), 8_400);
        assert_eq!(totals.service_charge.paise(), 3_780);
        assert_eq!(totals.tax.paise(), 3_969);
        assert_eq!(totals.grand_total.paise(), 83_300);
    }

    #[test]
    fn test_identical_items_merge() {
        let mut order = dine_in();
        order
            .add_item(NewOrderItem::new(menu("m-1", "Dal", 20_000), 1))
            .unwrap();
        order
            .add_item(NewOrderItem::new(menu("m-1", "Dal", 20_000), 2))
            .unwrap();
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].quantity, 3);

        let mut with_note = NewOrderItem::new(menu("m-1", "Dal", 20_000), 1);
        with_note.note = Some("no onion".into());
        order.add_item(with_note).unwrap();
        assert_eq!(order.items().len(), 2);
    }

    #[test]
    fn test_unit_price_resolution() {
        let mut takeaway = Order::new(order_number(), OrderType::Takeaway, PricingPolicy::default());
        let mut item = menu("m-1", "Biryani", 30_000);
        item.takeaway_price = Some(Money::from_paise(28_000));

        let line = takeaway.add_item(NewOrderItem::new(item.clone(), 1)).unwrap();
        assert_eq!(line.unit_price.paise(), 28_000);

        let mut half = NewOrderItem::new(item.clone(), 1);
        half.variant = Some(Variant {
            portion: Portion::Half,
            price: Money::from_paise(18_000),
        });
        half.modifiers = vec![Modifier {
            id: "raita".into(),
            name: "Raita".into(),
            price: Money::from_paise(4_000),
        }];
        half.quantity = 2;
        let line = takeaway.add_item(half).unwrap();
        assert_eq!(line.unit_price.paise(), 18_000);
        assert_eq!(line.line_total.paise(), 44_000);

        let mut dine = dine_in();
        let line = dine.add_item(NewOrderItem::new(item, 1)).unwrap();
        assert_eq!(line.unit_price.paise(), 30_000);
    }

    #[test]
    fn test_quantity_operations() {
        let mut order = dine_in();
        let id = order
            .add_item(NewOrderItem::new(menu("m-1", "Naan", 5_000), 1))
            .unwrap()
            .id
            .clone();

        order.increment_item(&id).unwrap();
        assert_eq!(order.item(&id).unwrap().quantity, 2);

        assert!(matches!(
            order.set_quantity(&id, -3),
            Err(CoreError::NegativeQuantity { requested: -3, .. })
        ));
        assert!(matches!(
            order.set_quantity(&id, 1_000),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        order.decrement_item(&id).unwrap();
        order.decrement_item(&id).unwrap();
        assert!(order.items().is_empty());
        assert_eq!(*order.totals(), BillTotals::default());
        assert!(matches!(
            order.remove_item(&id),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_kot_sends_only_new_quantities() {
        let mut order = dine_in();
        assert!(matches!(
            order.generate_kot(Utc::now()),
            Err(CoreError::EmptyOrder { .. })
        ));

        let id = order
            .add_item(NewOrderItem::new(menu("m-1", "Soup", 9_000), 2))
            .unwrap()
            .id
            .clone();
        let first = order.generate_kot(Utc::now()).unwrap();
        assert_eq!(first.kot_number, 1);
        assert_eq!(first.lines[0].quantity, 2);
        assert_eq!(first.table_number, Some(4));

        assert!(matches!(
            order.generate_kot(Utc::now()),
            Err(CoreError::NoPendingItems { .. })
        ));

        order.increment_item(&id).unwrap();
        let second = order.generate_kot(Utc::now()).unwrap();
        assert_eq!(second.kot_number, 2);
        assert_eq!(second.lines.len(), 1);
        assert_eq!(second.lines[0].quantity, 1);
        assert_eq!(order.status(), OrderStatus::KotSent);
    }

    #[test]
    fn test_billed_order_locks_items_but_not_discount() {
        let mut order = dine_in();
        order
            .add_item(NewOrderItem::new(menu("m-1", "Tea", 3_000), 1))
            .unwrap();
        order.generate_kot(Utc::now()).unwrap();
        order.print_bill().unwrap();
        order.print_bill().unwrap();

        assert!(matches!(
            order.add_item(NewOrderItem::new(menu("m-2", "Coffee", 4_000), 1)),
            Err(CoreError::OrderLocked { .. })
        ));
        order.apply_discount(Discount::Fixed(Money::from_paise(500))).unwrap();
        assert_eq!(order.totals().discount_amount.paise(), 500);
    }

    #[test]
    fn test_invalid_discount_rejected() {
        let mut order = dine_in();
        assert!(matches!(
            order.apply_discount(Discount::Percentage(Rate::from_bps(15_000))),
            Err(CoreError::InvalidDiscount { .. })
        ));
        assert!(matches!(
            order.apply_discount(Discount::Fixed(Money::from_paise(-1))),
            Err(CoreError::InvalidDiscount { .. })
        ));
    }

    #[test]
    fn test_scenario_split_tender_settles() {
        let mut order = order_with_grand_total_500();
        assert_eq!(order.balance_due().paise(), 50_000);

        order
            .add_payment(PaymentMethod::Cash, Money::from_paise(30_000), None)
            .unwrap();
        assert_eq!(order.balance_due().paise(), 20_000);
        assert_eq!(order.payment_status(), PaymentStatus::Partial);

        let upi = order
            .add_payment(PaymentMethod::Upi, Money::from_paise(25_000), None)
            .unwrap();
        assert_eq!(upi.amount.paise(), 20_000);
        assert!(order.balance_due().is_zero());

        order.complete_payment(Utc::now()).unwrap();
        assert_eq!(order.status(), OrderStatus::Settled);
        assert_eq!(order.payment_status(), PaymentStatus::Paid);
        assert_eq!(order.paid(), order.totals().grand_total);
        assert_eq!(order.payments().len(), 2);
        assert!(order.collection().is_none());
    }

    #[test]
    fn test_scenario_payment_with_zero_balance_rejected() {
        let mut order = order_with_grand_total_500();
        order
            .add_payment(PaymentMethod::Card, Money::from_paise(50_000), None)
            .unwrap();

        let err = order
            .add_payment(PaymentMethod::Cash, Money::from_paise(10_000), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPaymentAmount { .. }));
    }

    #[test]
    fn test_scenario_void_after_settlement_rejected() {
        let mut order = order_with_grand_total_500();
        order
            .add_payment(PaymentMethod::Cash, Money::from_paise(50_000), None)
            .unwrap();
        order.complete_payment(Utc::now()).unwrap();

        let err = order.void("customer left", Utc::now()).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidTransition {
                from: OrderStatus::Settled,
                event: SettlementEvent::Void,
            }
        );
    }

    #[test]
    fn test_incomplete_payment_keeps_session() {
        let mut order = order_with_grand_total_500();
        assert!(matches!(
            order.complete_payment(Utc::now()),
            Err(CoreError::NoPayments)
        ));

        order
            .add_payment(PaymentMethod::Cash, Money::from_paise(10_000), None)
            .unwrap();
        assert!(matches!(
            order.complete_payment(Utc::now()),
            Err(CoreError::InsufficientPayment { .. })
        ));
        assert_eq!(order.tendered().paise(), 10_000);
        assert_eq!(order.status(), OrderStatus::Active);
    }

    #[test]
    fn test_open_tenders_block_edits() {
        let mut order = order_with_grand_total_500();
        let payment = order
            .add_payment(PaymentMethod::Cash, Money::from_paise(10_000), None)
            .unwrap();

        assert!(matches!(
            order.add_item(NewOrderItem::new(menu("m-2", "Lassi", 6_000), 1)),
            Err(CoreError::PaymentInProgress { .. })
        ));
        assert!(matches!(
            order.apply_discount(Discount::Fixed(Money::from_paise(100))),
            Err(CoreError::PaymentInProgress { .. })
        ));

        order.remove_payment(&payment.id).unwrap();
        assert!(order.collection().is_none());
        order
            .add_item(NewOrderItem::new(menu("m-2", "Lassi", 6_000), 1))
            .unwrap();
    }

    #[test]
    fn test_no_charge_settlement() {
        let mut order = dine_in();
        order
            .add_item(NewOrderItem::new(menu("m-1", "Dessert", 15_000), 1))
            .unwrap();
        assert!(matches!(
            order.settle_no_charge(Utc::now()),
            Err(CoreError::NoPayments)
        ));

        order.mark_no_charge("owner's guest").unwrap();
        assert!(order.totals().grand_total.is_zero());
        assert_eq!(order.totals().subtotal.paise(), 15_000);

        order.settle_no_charge(Utc::now()).unwrap();
        assert_eq!(order.status(), OrderStatus::Settled);
        assert_eq!(order.payment_status(), PaymentStatus::Paid);
    }

    #[test]
    fn test_empty_order_never_settles() {
        let mut order = dine_in();
        assert!(order.totals().grand_total.is_zero());
        assert!(matches!(
            order.settle_no_charge(Utc::now()),
            Err(CoreError::NoPayments)
        ));

        order.mark_no_charge("staff meal").unwrap();
        assert!(matches!(
            order.settle_no_charge(Utc::now()),
            Err(CoreError::EmptyOrder { .. })
        ));
        assert!(order.complete_payment(Utc::now()).is_err());
        assert_eq!(order.status(), OrderStatus::Active);
        assert!(order.payments().is_empty());
    }

    #[test]
    fn test_oversized_amounts_are_rejected_without_change() {
        let mut order = dine_in();
        let err = order
            .add_item(NewOrderItem::new(menu("m-1", "Gold Thali", i64::MAX / 2), 3))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(order.items().is_empty());

        let max_price = crate::MAX_UNIT_PRICE.paise();
        let line = order
            .add_item(NewOrderItem::new(menu("m-2", "Banquet", max_price), 50))
            .unwrap()
            .id
            .clone();
        order
            .add_item(NewOrderItem::new(menu("m-3", "Hall", max_price), 1))
            .unwrap();

        // Exactly at the subtotal ceiling is fine, one step past is not.
        order.set_quantity(&line, 99).unwrap();
        assert!(matches!(
            order.set_quantity(&line, 999),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert_eq!(order.item(&line).unwrap().quantity, 99);
        assert_eq!(order.totals().subtotal, MAX_ORDER_SUBTOTAL);
        assert!(order.totals().grand_total.is_positive());

        let heavy = NewOrderItem {
            modifiers: (0..10)
                .map(|i| Modifier {
                    id: format!("mod-{i}"),
                    name: "Gold leaf".into(),
                    price: crate::MAX_UNIT_PRICE,
                })
                .collect(),
            ..NewOrderItem::new(menu("m-4", "Royal Platter", max_price), 999)
        };
        assert!(matches!(
            order.add_item(heavy),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert_eq!(order.items().len(), 2);
    }

    #[test]
    fn test_void_discards_open_tenders() {
        let mut order = order_with_grand_total_500();
        order
            .add_payment(PaymentMethod::Cash, Money::from_paise(10_000), None)
            .unwrap();
        order.void("wrong table", Utc::now()).unwrap();

        assert_eq!(order.status(), OrderStatus::Void);
        assert!(order.collection().is_none());
        assert!(order.void("again", Utc::now()).is_err());
    }

    #[test]
    fn test_order_round_trips_through_json() {
        let mut order = order_with_grand_total_500();
        order
            .add_payment(PaymentMethod::Upi, Money::from_paise(5_000), Some("ref".into()))
            .unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let restored: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, order);
        assert_eq!(restored.tendered().paise(), 5_000);
    }
}
