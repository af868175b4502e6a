//! PostgreSQL store
//!
//! Relational variant. Uniqueness is enforced by the primary keys
//! (`consumers.consumer_id` and `bills (consumer_id, month, year)`); a
//! unique violation surfaces as the same conflict error the file backend
//! produces. There is deliberately no multi-statement transaction around
//! the existence-check/insert pair in the API layer.

use sqlx::PgPool;

use crate::domain::{AppState, Bill, Consumer, DEFAULT_COST_PER_UNIT};
use crate::error::{AppError, AppResult};

const COST_PER_UNIT_KEY: &str = "cost_per_unit";

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false)
}

type ConsumerRow = (i64, String, String, String);
type BillRow = (i64, i32, i32, f64, f64);

fn consumer_from_row((consumer_id, name, address, mobile_no): ConsumerRow) -> Consumer {
    Consumer {
        consumer_id,
        name,
        address,
        mobile_no,
    }
}

fn bill_from_row((consumer_id, month, year, units_consumed, amt): BillRow) -> Bill {
    Bill {
        consumer_id,
        month,
        year,
        units_consumed,
        amt,
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Snapshot: consumers ascending by id, bills newest period first.
    pub async fn state(&self) -> AppResult<AppState> {
        let consumers: Vec<ConsumerRow> = sqlx::query_as(
            r#"
            SELECT consumer_id, name, address, mobile_no
            FROM consumers
            ORDER BY consumer_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let bills: Vec<BillRow> = sqlx::query_as(
            r#"
            SELECT consumer_id, month, year, units_consumed, amt
            FROM bills
            ORDER BY year DESC, month DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let cost_per_unit = self.cost_per_unit().await?;

        Ok(AppState {
            consumers: consumers.into_iter().map(consumer_from_row).collect(),
            bills: bills.into_iter().map(bill_from_row).collect(),
            cost_per_unit,
        })
    }

    pub async fn find_consumer(&self, consumer_id: i64) -> AppResult<Option<Consumer>> {
        let row: Option<ConsumerRow> = sqlx::query_as(
            r#"
            SELECT consumer_id, name, address, mobile_no
            FROM consumers
            WHERE consumer_id = $1
            "#,
        )
        .bind(consumer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(consumer_from_row))
    }

    pub async fn insert_consumer(&self, consumer: Consumer) -> AppResult<Consumer> {
        sqlx::query(
            r#"
            INSERT INTO consumers (consumer_id, name, address, mobile_no)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(consumer.consumer_id)
        .bind(&consumer.name)
        .bind(&consumer.address)
        .bind(&consumer.mobile_no)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateConsumer
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(consumer)
    }

    pub async fn delete_consumer(&self, consumer_id: i64) -> AppResult<()> {
        // Cascade handled by the FK, but the bill delete is explicit so the
        // two backends read the same.
        sqlx::query("DELETE FROM bills WHERE consumer_id = $1")
            .bind(consumer_id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM consumers WHERE consumer_id = $1")
            .bind(consumer_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn find_bill(
        &self,
        consumer_id: i64,
        year: i32,
        month: i32,
    ) -> AppResult<Option<Bill>> {
        let row: Option<BillRow> = sqlx::query_as(
            r#"
            SELECT consumer_id, month, year, units_consumed, amt
            FROM bills
            WHERE consumer_id = $1 AND year = $2 AND month = $3
            "#,
        )
        .bind(consumer_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(bill_from_row))
    }

    pub async fn insert_bill(&self, bill: Bill) -> AppResult<Bill> {
        sqlx::query(
            r#"
            INSERT INTO bills (consumer_id, month, year, units_consumed, amt)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(bill.consumer_id)
        .bind(bill.month)
        .bind(bill.year)
        .bind(bill.units_consumed)
        .bind(bill.amt)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateBill
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(bill)
    }

    pub async fn delete_bill(&self, consumer_id: i64, year: i32, month: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM bills WHERE consumer_id = $1 AND year = $2 AND month = $3")
            .bind(consumer_id)
            .bind(year)
            .bind(month)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn previous_bills(
        &self,
        consumer_id: i64,
        year: i32,
        month: i32,
    ) -> AppResult<Vec<Bill>> {
        let rows: Vec<BillRow> = sqlx::query_as(
            r#"
            SELECT consumer_id, month, year, units_consumed, amt
            FROM bills
            WHERE consumer_id = $1
              AND (year < $2 OR (year = $2 AND month < $3))
            ORDER BY year DESC, month DESC
            LIMIT 3
            "#,
        )
        .bind(consumer_id)
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(bill_from_row).collect())
    }

    /// Settings live in a single key/value row; missing or unparseable
    /// values fall back to the default rate.
    pub async fn cost_per_unit(&self) -> AppResult<f64> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(COST_PER_UNIT_KEY)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COST_PER_UNIT))
    }

    pub async fn set_cost_per_unit(&self, value: f64) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(COST_PER_UNIT_KEY)
        .bind(value.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
