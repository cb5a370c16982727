//! # Order Repository
//!
//! SQLite storage for the order aggregate.
//!
//! ## Row Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders                                                                 │
//! │  ├── id, tenant_id, order_number, business_date   (identity)           │
//! │  ├── order_type, status, table_id                 (filters)            │
//! │  ├── grand_total, paid                            (reporting)          │
//! │  ├── payload  ← the whole Order as JSON           (source of truth)    │
//! │  └── version                                      (optimistic lock)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scalar columns are rewritten from the aggregate on every update so
//! they never drift from the payload.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use hearth_core::{Order, OrderStatus};

use crate::error::{DbError, DbResult};
use crate::repository::OrderRepository;

const SELECT_COLUMNS: &str = "SELECT payload, version FROM orders";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool, tenant_id: &str) -> Self {
        SqliteOrderRepository {
            pool,
            tenant_id: tenant_id.to_string(),
        }
    }

    fn decode(row: &SqliteRow) -> DbResult<Order> {
        let payload: String = row.try_get("payload")?;
        let mut order: Order = serde_json::from_str(&payload)?;
        order.version = row.try_get("version")?;
        Ok(order)
    }

    async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE id = ?1 AND tenant_id = ?2")
                .bind(id)
                .bind(&self.tenant_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

impl OrderRepository for SqliteOrderRepository {
    async fn insert(&self, order: &mut Order) -> DbResult<()> {
        debug!(id = %order.id, order_number = %order.order_number, "Inserting order");

        order.version = 1;
        let payload = serde_json::to_string(&*order)?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                id, tenant_id, order_number, order_type, status, table_id,
                business_date, grand_total, paid, payload, version,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&order.id)
        .bind(&self.tenant_id)
        .bind(order.order_number.as_str())
        .bind(order.order_type)
        .bind(order.status())
        .bind(&order.table_id)
        .bind(order.business_date())
        .bind(order.totals().grand_total.paise())
        .bind(order.paid().paise())
        .bind(payload)
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            order.version = 0;
            return Err(match DbError::from(err) {
                DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                    field,
                    value: order.order_number.to_string(),
                },
                other => other,
            });
        }

        Ok(())
    }

    async fn update(&self, order: &mut Order) -> DbResult<()> {
        let expected = order.version;
        order.version = expected + 1;

        debug!(
            id = %order.id,
            status = %order.status(),
            version = order.version,
            "Updating order"
        );

        let payload = match serde_json::to_string(&*order) {
            Ok(payload) => payload,
            Err(err) => {
                order.version = expected;
                return Err(err.into());
            }
        };

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?1,
                table_id = ?2,
                grand_total = ?3,
                paid = ?4,
                payload = ?5,
                version = ?6,
                updated_at = ?7
            WHERE id = ?8 AND tenant_id = ?9 AND version = ?10
            "#,
        )
        .bind(order.status())
        .bind(&order.table_id)
        .bind(order.totals().grand_total.paise())
        .bind(order.paid().paise())
        .bind(payload)
        .bind(order.version)
        .bind(order.updated_at)
        .bind(&order.id)
        .bind(&self.tenant_id)
        .bind(expected)
        .execute(&self.pool)
        .await;

        let rows = match result {
            Ok(done) => done.rows_affected(),
            Err(err) => {
                order.version = expected;
                return Err(err.into());
            }
        };

        if rows == 0 {
            order.version = expected;
            if self.exists(&order.id).await? {
                warn!(id = %order.id, expected, "Order version conflict");
                return Err(DbError::conflict("Order", &order.id, expected));
            }
            return Err(DbError::not_found("Order", &order.id));
        }

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE id = ?1 AND tenant_id = ?2"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE tenant_id = ?1 AND (?2 IS NULL OR status = ?2) \
             ORDER BY created_at DESC"
        ))
        .bind(&self.tenant_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode).collect()
    }

    async fn list_by_date(&self, date: NaiveDate) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE tenant_id = ?1 AND business_date = ?2 ORDER BY created_at"
        ))
        .bind(&self.tenant_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode).collect()
    }

    async fn count_for_date(&self, date: NaiveDate) -> DbResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE tenant_id = ?1 AND business_date = ?2",
        )
        .bind(&self.tenant_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u32)
    }
}

// =============================================================================
// Tests
// =============================================================================
