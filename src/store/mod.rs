//! Persistence backends
//!
//! Two interchangeable stores behind one dispatch type: a single JSON
//! document on disk, and PostgreSQL with store-enforced unique
//! constraints. Handlers only ever see `Store`.

pub mod file;
pub mod postgres;

pub use file::FileStore;
pub use postgres::PgStore;

use crate::domain::{AppState, Bill, Consumer};
use crate::error::AppResult;

/// Backend dispatch. Cloned freely into handlers as axum state.
#[derive(Clone)]
pub enum Store {
    File(FileStore),
    Postgres(PgStore),
}

impl Store {
    /// Full `{consumers, bills, cost_per_unit}` snapshot.
    pub async fn state(&self) -> AppResult<AppState> {
        match self {
            Store::File(s) => s.state().await,
            Store::Postgres(s) => s.state().await,
        }
    }

    pub async fn find_consumer(&self, consumer_id: i64) -> AppResult<Option<Consumer>> {
        match self {
            Store::File(s) => s.find_consumer(consumer_id).await,
            Store::Postgres(s) => s.find_consumer(consumer_id).await,
        }
    }

    /// Fails with `AppError::DuplicateConsumer` if the id is taken.
    pub async fn insert_consumer(&self, consumer: Consumer) -> AppResult<Consumer> {
        match self {
            Store::File(s) => s.insert_consumer(consumer).await,
            Store::Postgres(s) => s.insert_consumer(consumer).await,
        }
    }

    /// Deletes the consumer and all of its bills. Idempotent.
    pub async fn delete_consumer(&self, consumer_id: i64) -> AppResult<()> {
        match self {
            Store::File(s) => s.delete_consumer(consumer_id).await,
            Store::Postgres(s) => s.delete_consumer(consumer_id).await,
        }
    }

    pub async fn find_bill(
        &self,
        consumer_id: i64,
        year: i32,
        month: i32,
    ) -> AppResult<Option<Bill>> {
        match self {
            Store::File(s) => s.find_bill(consumer_id, year, month).await,
            Store::Postgres(s) => s.find_bill(consumer_id, year, month).await,
        }
    }

    /// Fails with `AppError::DuplicateBill` if the period already has one.
    pub async fn insert_bill(&self, bill: Bill) -> AppResult<Bill> {
        match self {
            Store::File(s) => s.insert_bill(bill).await,
            Store::Postgres(s) => s.insert_bill(bill).await,
        }
    }

    /// Idempotent delete by (consumerID, year, month).
    pub async fn delete_bill(&self, consumer_id: i64, year: i32, month: i32) -> AppResult<()> {
        match self {
            Store::File(s) => s.delete_bill(consumer_id, year, month).await,
            Store::Postgres(s) => s.delete_bill(consumer_id, year, month).await,
        }
    }

    /// Up to 3 most recent bills strictly before (year, month), newest first.
    pub async fn previous_bills(
        &self,
        consumer_id: i64,
        year: i32,
        month: i32,
    ) -> AppResult<Vec<Bill>> {
        match self {
            Store::File(s) => s.previous_bills(consumer_id, year, month).await,
            Store::Postgres(s) => s.previous_bills(consumer_id, year, month).await,
        }
    }

    pub async fn cost_per_unit(&self) -> AppResult<f64> {
        match self {
            Store::File(s) => s.cost_per_unit().await,
            Store::Postgres(s) => s.cost_per_unit().await,
        }
    }

    /// Affects only bills created afterward; stored amounts keep their value.
    pub async fn set_cost_per_unit(&self, value: f64) -> AppResult<()> {
        match self {
            Store::File(s) => s.set_cost_per_unit(value).await,
            Store::Postgres(s) => s.set_cost_per_unit(value).await,
        }
    }
}
