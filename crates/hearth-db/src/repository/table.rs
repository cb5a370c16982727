//! # Dining Table Repository
//!
//! SQLite storage for the floor plan. The seated order summary is stored
//! as JSON in `current_order`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use hearth_core::{Table, TableOrderSummary, TableStatus};

use crate::error::{DbError, DbResult};
use crate::repository::TableRepository;

const SELECT_COLUMNS: &str = "SELECT id, number, capacity, section, status, current_order, \
                              version, updated_at FROM dining_tables";

/// Repository for dining table operations.
#[derive(Debug, Clone)]
pub struct SqliteTableRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl SqliteTableRepository {
    pub fn new(pool: SqlitePool, tenant_id: &str) -> Self {
        SqliteTableRepository {
            pool,
            tenant_id: tenant_id.to_string(),
        }
    }

    fn decode(row: &SqliteRow) -> DbResult<Table> {
        let current_order: Option<String> = row.try_get("current_order")?;
        let current_order = current_order
            .map(|json| serde_json::from_str::<TableOrderSummary>(&json))
            .transpose()?;

        Ok(Table {
            id: row.try_get("id")?,
            number: row.try_get("number")?,
            capacity: row.try_get("capacity")?,
            section: row.try_get("section")?,
            status: row.try_get::<TableStatus, _>("status")?,
            current_order,
            version: row.try_get("version")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    fn encode_summary(table: &Table) -> DbResult<Option<String>> {
        Ok(table
            .current_order
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?)
    }
}

impl TableRepository for SqliteTableRepository {
    async fn insert(&self, table: &mut Table) -> DbResult<()> {
        debug!(id = %table.id, number = table.number, "Inserting table");

        let current_order = Self::encode_summary(table)?;
        let result = sqlx::query(
            r#"
            INSERT INTO dining_tables (
                id, tenant_id, number, capacity, section, status,
                current_order, version, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
            "#,
        )
        .bind(&table.id)
        .bind(&self.tenant_id)
        .bind(table.number)
        .bind(table.capacity)
        .bind(&table.section)
        .bind(table.status)
        .bind(current_order)
        .bind(table.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                table.version = 1;
                Ok(())
            }
            Err(err) => Err(match DbError::from(err) {
                DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                    field,
                    value: table.number.to_string(),
                },
                other => other,
            }),
        }
    }

    async fn update(&self, table: &mut Table) -> DbResult<()> {
        let expected = table.version;
        debug!(id = %table.id, status = %table.status, version = expected, "Updating table");

        let current_order = Self::encode_summary(table)?;
        let result = sqlx::query(
            r#"
            UPDATE dining_tables SET
                capacity = ?1,
                section = ?2,
                status = ?3,
                current_order = ?4,
                version = version + 1,
                updated_at = ?5
            WHERE id = ?6 AND tenant_id = ?7 AND version = ?8
            "#,
        )
        .bind(table.capacity)
        .bind(&table.section)
        .bind(table.status)
        .bind(current_order)
        .bind(table.updated_at)
        .bind(&table.id)
        .bind(&self.tenant_id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM dining_tables WHERE id = ?1 AND tenant_id = ?2",
            )
            .bind(&table.id)
            .bind(&self.tenant_id)
            .fetch_one(&self.pool)
            .await?;

            if exists > 0 {
                warn!(id = %table.id, expected, "Table version conflict");
                return Err(DbError::conflict("Table", &table.id, expected));
            }
            return Err(DbError::not_found("Table", &table.id));
        }

        table.version = expected + 1;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Table>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?1 AND tenant_id = ?2"))
            .bind(id)
            .bind(&self.tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn get_by_number(&self, number: u32) -> DbResult<Option<Table>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE number = ?1 AND tenant_id = ?2"
        ))
        .bind(number)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list(&self) -> DbResult<Vec<Table>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE tenant_id = ?1 ORDER BY number"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use hearth_core::{MenuItemRef, Money, NewOrderItem, Order, OrderNumber, OrderType, PricingPolicy};

    async fn repo() -> SqliteTableRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().tables()
    }

    fn seated_order(table: &Table) -> Order {
        let number = OrderNumber::new(Utc::now().date_naive(), 1);
        let mut order = Order::new(number, OrderType::DineIn, PricingPolicy::default())
            .with_table(table.id.clone(), table.number);
        order
            .add_item(NewOrderItem::new(
                MenuItemRef {
                    id: "m-1".into(),
                    name: "Idli".into(),
                    price: Money::from_paise(6_000),
                    takeaway_price: None,
                },
                3,
            ))
            .unwrap();
        order
    }

    #[tokio::test]
    async fn test_insert_and_list_in_number_order() {
        let repo = repo().await;
        for number in [12, 3, 7] {
            let mut table = Table::new(number, 4, Some("Main")).unwrap();
            repo.insert(&mut table).await.unwrap();
            assert_eq!(table.version, 1);
        }

        let numbers: Vec<u32> = repo.list().await.unwrap().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![3, 7, 12]);

        let seven = repo.get_by_number(7).await.unwrap().unwrap();
        assert_eq!(seven.section.as_deref(), Some("Main"));
        assert!(repo.get_by_number(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_occupied_table_round_trip() {
        let repo = repo().await;
        let mut table = Table::new(5, 2, None).unwrap();
        repo.insert(&mut table).await.unwrap();

        let order = seated_order(&table);
        table.occupy(&order).unwrap();
        repo.update(&mut table).await.unwrap();
        assert_eq!(table.version, 2);

        let loaded = repo.get_by_id(&table.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, TableStatus::Occupied);
        let summary = loaded.current_order.unwrap();
        assert_eq!(summary.order_id, order.id);
        assert_eq!(summary.amount, order.totals().grand_total);
    }

    #[tokio::test]
    async fn test_duplicate_number_and_stale_update() {
        let repo = repo().await;
        let mut table = Table::new(1, 4, None).unwrap();
        repo.insert(&mut table).await.unwrap();

        let err = repo
            .insert(&mut Table::new(1, 6, None).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let mut stale = table.clone();
        table.reserve().unwrap();
        repo.update(&mut table).await.unwrap();

        stale.reserve().unwrap();
        assert!(matches!(
            repo.update(&mut stale).await,
            Err(DbError::VersionConflict { .. })
        ));
    }
}
