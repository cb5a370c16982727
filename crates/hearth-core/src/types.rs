//! # Domain Types
//!
//! Core value types shared by the bill calculator, the settlement state
//! machine and the payment collector.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   MenuItemRef   │   │    Discount     │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  Percentage(%)  │   │  id (UUID)      │       │
//! │  │  price          │   │  Fixed(Money)   │   │  order_id       │       │
//! │  │  takeaway_price │   └─────────────────┘   │  method, amount │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │   OrderStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  active         │   │  cash           │       │
//! │  │  500 = 5%       │   │  kot-sent       │   │  card           │       │
//! │  └─────────────────┘   │  billed         │   │  upi            │       │
//! │                        │  settled / void │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 500 bps = 5% (GST on restaurant
/// food) and 1000 bps = a 10% discount. Integer rates keep every
/// calculation exact until the final rounding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

/// Basis points in 100%.
pub const FULL_RATE_BPS: u32 = 10_000;

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for configuration input).
    ///
    /// Non-finite or negative input saturates to zero; validate with
    /// [`crate::validation::validate_percentage`] first.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// 100%.
    #[inline]
    pub const fn full() -> Self {
        Rate(FULL_RATE_BPS)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Order Type
// =============================================================================

/// How the order is served. Drives service charge and takeaway pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine-in",
            OrderType::Takeaway => "takeaway",
            OrderType::Delivery => "delivery",
        }
    }

    /// Takeaway and delivery orders use the menu's takeaway price when one exists.
    pub fn uses_takeaway_price(&self) -> bool {
        matches!(self, OrderType::Takeaway | OrderType::Delivery)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Flat, display-level status of an order.
///
/// The authoritative lifecycle lives in [`crate::settlement::OrderState`];
/// this enum is what the front-end and the `orders.status` column see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Active,
    KotSent,
    Billed,
    Settled,
    Void,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::KotSent => "kot-sent",
            OrderStatus::Billed => "billed",
            OrderStatus::Settled => "settled",
            OrderStatus::Void => "void",
        }
    }

    /// Settled and void orders never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Settled | OrderStatus::Void)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment progress against the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// `0 → unpaid`, `0 < received < total → partial`, `received ≥ total → paid`.
    ///
    /// A zero total with nothing received is still `unpaid`; only
    /// settlement makes a zero-value order `paid`.
    pub fn from_amounts(received: Money, grand_total: Money) -> Self {
        if !received.is_positive() {
            PaymentStatus::Unpaid
        } else if received < grand_total {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Paid
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Card on an external terminal.
    Card,
    /// UPI transfer (QR or VPA).
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Order-level discount as entered by the cashier.
///
/// ```json
/// { "type": "percentage", "value": 1000 }   // 10%
/// { "type": "fixed", "value": 5000 }        // ₹50.00
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Discount {
    Percentage(Rate),
    Fixed(Money),
}

impl Discount {
    /// Discount amount against `subtotal`, clamped to `[0, subtotal]`.
    pub fn amount_on(&self, subtotal: Money) -> Money {
        let raw = match self {
            Discount::Percentage(rate) => subtotal.percent_of(*rate),
            Discount::Fixed(amount) => *amount,
        };
        raw.clamp_to(Money::zero(), subtotal.max(Money::zero()))
    }
}

// =============================================================================
// Menu Snapshot Types
// =============================================================================

/// Portion sizes offered for a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Portion {
    Full,
    Half,
    Quarter,
}

impl Portion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Portion::Full => "full",
            Portion::Half => "half",
            Portion::Quarter => "quarter",
        }
    }
}

/// A selected portion with its own independent price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Variant {
    pub portion: Portion,
    pub price: Money,
}

/// An add-on priced per unit of the line it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Modifier {
    pub id: String,
    pub name: String,
    pub price: Money,
}

/// Snapshot of the menu entry at the time it was ordered.
///
/// Frozen on the order line so menu price edits never change an open bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRef {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub takeaway_price: Option<Money>,
}

// =============================================================================
// Payment
// =============================================================================

/// A tendered payment towards an order.
/// An order can carry several payments (split tender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    /// Back-reference to the order, not ownership.
    pub order_id: String,
    pub method: PaymentMethod,
    pub amount: Money,
    /// Card auth code, UPI transaction id, etc.
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_bps_and_percentage() {
        let rate = Rate::from_bps(500);
        assert_eq!(rate.bps(), 500);
        assert!((rate.percentage() - 5.0).abs() < 0.001);
        assert_eq!(Rate::from_percentage(12.5).bps(), 1_250);
        assert_eq!(Rate::from_percentage(f64::NAN).bps(), 0);
    }

    #[test]
    fn test_discount_amount_is_bounded() {
        let subtotal = Money::from_paise(84_000);
        assert_eq!(
            Discount::Percentage(Rate::from_bps(1_000)).amount_on(subtotal).paise(),
            8_400
        );
        assert_eq!(
            Discount::Fixed(Money::from_paise(100_000)).amount_on(subtotal),
            subtotal
        );
        assert_eq!(
            Discount::Percentage(Rate::from_bps(25_000)).amount_on(subtotal),
            subtotal
        );
        assert_eq!(
            Discount::Fixed(Money::from_paise(500)).amount_on(Money::zero()),
            Money::zero()
        );
    }

    #[test]
    fn test_discount_serde_shape() {
        let json = serde_json::to_string(&Discount::Percentage(Rate::from_bps(1_000))).unwrap();
        assert_eq!(json, r#"{"type":"percentage","value":1000}"#);

        let parsed: Discount = serde_json::from_str(r#"{"type":"fixed","value":2500}"#).unwrap();
        assert_eq!(parsed, Discount::Fixed(Money::from_paise(2_500)));
    }

    #[test]
    fn test_payment_status_from_amounts() {
        let total = Money::from_paise(50_000);
        assert_eq!(PaymentStatus::from_amounts(Money::zero(), total), PaymentStatus::Unpaid);
        assert_eq!(
            PaymentStatus::from_amounts(Money::from_paise(30_000), total),
            PaymentStatus::Partial
        );
        assert_eq!(PaymentStatus::from_amounts(total, total), PaymentStatus::Paid);
        assert_eq!(
            PaymentStatus::from_amounts(Money::zero(), Money::zero()),
            PaymentStatus::Unpaid
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&OrderStatus::KotSent).unwrap(), r#""kot-sent""#);
        assert_eq!(serde_json::to_string(&OrderType::DineIn).unwrap(), r#""dine-in""#);
        assert!(OrderStatus::Void.is_terminal());
        assert!(!OrderStatus::Billed.is_terminal());
    }
}
