//! # Tables
//!
//! Dining tables and their service lifecycle.
//!
//! ```text
//!               reserve                     occupy
//!  ┌───────────┐ ──────► ┌──────────┐ ─────────────────┐
//!  │ available │         │ reserved │                  ▼
//!  └───────────┘ ◄────── └──────────┘            ┌──────────┐
//!     ▲   ▲   cancel_reservation       occupy    │ occupied │ ◄─ refresh
//!     │   └──────────────────────────────────────┤          │
//!     │                 release (void)           └────┬─────┘
//!     │                                               │ release_for_cleaning
//!     │               mark_clean              ┌───────▼──┐      (settle)
//!     └───────────────────────────────────────│ cleaning │
//!                                             └──────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::{Order, OrderNumber};
use crate::validation::{validate_capacity, validate_optional_text, validate_table_number};

/// Where a table is in its service cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Cleaning,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Cleaning => "cleaning",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the floor plan shows for a seated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableOrderSummary {
    pub order_id: String,
    pub order_number: OrderNumber,
    pub amount: Money,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
    pub items: Vec<String>,
}

impl TableOrderSummary {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            amount: order.totals().grand_total,
            started_at: order.created_at,
            items: order.item_labels(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub number: u32,
    pub capacity: u32,
    pub section: Option<String>,
    pub status: TableStatus,
    pub current_order: Option<TableOrderSummary>,
    #[serde(default)]
    pub version: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Table {
    pub fn new(number: u32, capacity: u32, section: Option<&str>) -> CoreResult<Self> {
        validate_table_number(number)?;
        validate_capacity(capacity)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            number,
            capacity,
            section: validate_optional_text("section", section)?,
            status: TableStatus::Available,
            current_order: None,
            version: 0,
            updated_at: Utc::now(),
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == TableStatus::Available
    }

    /// Seats `order` at this table.
    pub fn occupy(&mut self, order: &Order) -> CoreResult<()> {
        match self.status {
            TableStatus::Available | TableStatus::Reserved => {
                self.status = TableStatus::Occupied;
                self.current_order = Some(TableOrderSummary::from_order(order));
                self.touch();
                Ok(())
            }
            status => Err(CoreError::TableUnavailable {
                table: self.number,
                status,
            }),
        }
    }

    /// Updates the running amount and items shown for the seated order.
    pub fn refresh(&mut self, order: &Order) -> CoreResult<()> {
        let seated = self
            .current_order
            .as_ref()
            .is_some_and(|current| current.order_id == order.id);
        if self.status != TableStatus::Occupied || !seated {
            return Err(self.invalid("refresh"));
        }

        self.current_order = Some(TableOrderSummary::from_order(order));
        self.touch();
        Ok(())
    }

    /// After settlement the table needs bussing before the next party.
    pub fn release_for_cleaning(&mut self) -> CoreResult<()> {
        if self.status != TableStatus::Occupied {
            return Err(self.invalid("release"));
        }
        self.status = TableStatus::Cleaning;
        self.current_order = None;
        self.touch();
        Ok(())
    }

    /// Frees the table immediately (voided order).
    pub fn release(&mut self) -> CoreResult<()> {
        if self.status != TableStatus::Occupied {
            return Err(self.invalid("release"));
        }
        self.status = TableStatus::Available;
        self.current_order = None;
        self.touch();
        Ok(())
    }

    pub fn mark_clean(&mut self) -> CoreResult<()> {
        self.transition(TableStatus::Cleaning, TableStatus::Available, "clean")
    }

    pub fn reserve(&mut self) -> CoreResult<()> {
        self.transition(TableStatus::Available, TableStatus::Reserved, "reserve")
    }

    pub fn cancel_reservation(&mut self) -> CoreResult<()> {
        self.transition(TableStatus::Reserved, TableStatus::Available, "cancel the reservation for")
    }

    fn transition(
        &mut self,
        from: TableStatus,
        to: TableStatus,
        action: &'static str,
    ) -> CoreResult<()> {
        if self.status != from {
            return Err(self.invalid(action));
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTableTransition {
            table: self.number,
            from: self.status,
            action,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::NewOrderItem;
    use crate::pricing::PricingPolicy;
    use crate::types::{MenuItemRef, OrderType};
    use chrono::NaiveDate;

    fn order() -> Order {
        let number = OrderNumber::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 3);
        let mut order = Order::new(number, OrderType::DineIn, PricingPolicy::default());
        order
            .add_item(NewOrderItem::new(
                MenuItemRef {
                    id: "m-1".into(),
                    name: "Masala Dosa".into(),
                    price: Money::from_paise(12_000),
                    takeaway_price: None,
                },
                2,
            ))
            .unwrap();
        order
    }

    #[test]
    fn test_full_service_cycle() {
        let mut table = Table::new(7, 4, Some("Patio")).unwrap();
        let order = order();

        table.occupy(&order).unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        let summary = table.current_order.as_ref().unwrap();
        assert_eq!(summary.order_id, order.id);
        assert_eq!(summary.items, vec!["2× Masala Dosa".to_string()]);

        table.release_for_cleaning().unwrap();
        assert_eq!(table.status, TableStatus::Cleaning);
        assert!(table.current_order.is_none());

        table.mark_clean().unwrap();
        assert!(table.is_available());
    }

    #[test]
    fn test_busy_table_cannot_be_occupied() {
        let mut table = Table::new(1, 2, None).unwrap();
        table.occupy(&order()).unwrap();

        let err = table.occupy(&order()).unwrap_err();
        assert_eq!(
            err,
            CoreError::TableUnavailable {
                table: 1,
                status: TableStatus::Occupied,
            }
        );
    }

    #[test]
    fn test_reservation_flow() {
        let mut table = Table::new(2, 6, None).unwrap();
        table.reserve().unwrap();
        assert!(table.reserve().is_err());
        table.cancel_reservation().unwrap();
        assert!(table.is_available());

        table.reserve().unwrap();
        table.occupy(&order()).unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
    }

    #[test]
    fn test_refresh_only_for_seated_order() {
        let mut table = Table::new(3, 4, None).unwrap();
        let seated = order();
        assert!(table.refresh(&seated).is_err());

        table.occupy(&seated).unwrap();
        table.refresh(&seated).unwrap();
        assert!(matches!(
            table.refresh(&order()),
            Err(CoreError::InvalidTableTransition { action: "refresh", .. })
        ));
    }

    #[test]
    fn test_release_on_void() {
        let mut table = Table::new(4, 4, None).unwrap();
        assert!(table.release().is_err());
        table.occupy(&order()).unwrap();
        table.release().unwrap();
        assert!(table.is_available());
        assert!(table.mark_clean().is_err());
    }

    #[test]
    fn test_new_table_validation() {
        assert!(Table::new(0, 4, None).is_err());
        assert!(Table::new(5, 0, None).is_err());
    }
}
