//! # In-Memory Repositories
//!
//! `HashMap`-backed stand-ins for the SQLite repositories. They follow the
//! same versioning and uniqueness rules, so service and HTTP tests can run
//! without a database file.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use hearth_core::{Order, OrderStatus, Table};

use crate::error::{DbError, DbResult};
use crate::repository::{OrderRepository, TableRepository};

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &mut Order) -> DbResult<()> {
        let mut orders = self.orders.write().await;

        if orders.contains_key(&order.id) {
            return Err(DbError::duplicate("id", &order.id));
        }
        let date = order.business_date();
        if orders
            .values()
            .any(|o| o.order_number == order.order_number && o.business_date() == date)
        {
            return Err(DbError::duplicate("order_number", order.order_number.as_str()));
        }

        order.version = 1;
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &mut Order) -> DbResult<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.id)
            .ok_or_else(|| DbError::not_found("Order", &order.id))?;

        if stored.version != order.version {
            return Err(DbError::conflict("Order", &order.id, order.version));
        }

        order.version += 1;
        *stored = order.clone();
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn list(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|o| status.map_or(true, |s| o.status() == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn list_by_date(&self, date: NaiveDate) -> DbResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|o| o.business_date() == date)
            .cloned()
            .collect();
        found.sort_by_key(|o| o.created_at);
        Ok(found)
    }

    async fn count_for_date(&self, date: NaiveDate) -> DbResult<u32> {
        let orders = self.orders.read().await;
        Ok(orders.values().filter(|o| o.business_date() == date).count() as u32)
    }
}

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryTableRepository {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryTableRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableRepository for InMemoryTableRepository {
    async fn insert(&self, table: &mut Table) -> DbResult<()> {
        let mut tables = self.tables.write().await;

        if tables.contains_key(&table.id) {
            return Err(DbError::duplicate("id", &table.id));
        }
        if tables.values().any(|t| t.number == table.number) {
            return Err(DbError::duplicate("number", &table.number.to_string()));
        }

        table.version = 1;
        tables.insert(table.id.clone(), table.clone());
        Ok(())
    }

    async fn update(&self, table: &mut Table) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .get_mut(&table.id)
            .ok_or_else(|| DbError::not_found("Table", &table.id))?;

        if stored.version != table.version {
            return Err(DbError::conflict("Table", &table.id, table.version));
        }

        table.version += 1;
        *stored = table.clone();
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Table>> {
        Ok(self.tables.read().await.get(id).cloned())
    }

    async fn get_by_number(&self, number: u32) -> DbResult<Option<Table>> {
        let tables = self.tables.read().await;
        Ok(tables.values().find(|t| t.number == number).cloned())
    }

    async fn list(&self) -> DbResult<Vec<Table>> {
        let tables = self.tables.read().await;
        let mut found: Vec<Table> = tables.values().cloned().collect();
        found.sort_by_key(|t| t.number);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hearth_core::{OrderNumber, OrderType, PricingPolicy};

    fn order(seq: u32) -> Order {
        Order::new(
            OrderNumber::new(Utc::now().date_naive(), seq),
            OrderType::Takeaway,
            PricingPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_order_versioning_matches_sqlite() {
        let repo = InMemoryOrderRepository::new();
        let mut order = order(1);
        repo.insert(&mut order).await.unwrap();
        assert_eq!(order.version, 1);

        let mut stale = order.clone();
        order.void("test", Utc::now()).unwrap();
        repo.update(&mut order).await.unwrap();
        assert_eq!(order.version, 2);

        assert!(matches!(
            repo.update(&mut stale).await,
            Err(DbError::VersionConflict { expected: 1, .. })
        ));
        assert_eq!(
            repo.list(Some(OrderStatus::Void)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_order_number_unique_per_day() {
        let repo = InMemoryOrderRepository::new();
        repo.insert(&mut order(3)).await.unwrap();
        assert!(matches!(
            repo.insert(&mut order(3)).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert_eq!(
            repo.count_for_date(Utc::now().date_naive()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_missing_table_is_not_found() {
        let repo = InMemoryTableRepository::new();
        let mut table = Table::new(4, 2, None).unwrap();
        assert!(matches!(
            repo.update(&mut table).await,
            Err(DbError::NotFound { .. })
        ));

        repo.insert(&mut table).await.unwrap();
        assert!(matches!(
            repo.insert(&mut Table::new(4, 6, None).unwrap()).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert_eq!(repo.get_by_number(4).await.unwrap().unwrap().id, table.id);
    }
}
