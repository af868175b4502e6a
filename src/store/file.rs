//! File-backed store
//!
//! The whole state lives in one JSON document. Every mutation is a
//! load / modify / save of the complete document; there is no locking, so
//! concurrent writers race with last-save-wins semantics (accepted
//! limitation).

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::domain::{billing, AppState, Bill, Consumer};
use crate::error::{AppError, AppResult};

/// JSON-document backend rooted at a single file path.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. Never fails the caller: a missing, unreadable or
    /// corrupt file is treated as the default empty state.
    pub async fn load(&self) -> AppState {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => AppState::default(),
        }
    }

    /// Persist the full document. Writes a sibling temp file and renames it
    /// over the target so readers always observe a complete document.
    pub async fn save(&self, state: &AppState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| AppError::Internal(format!("state serialization failed: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn state(&self) -> AppResult<AppState> {
        Ok(self.load().await)
    }

    pub async fn find_consumer(&self, consumer_id: i64) -> AppResult<Option<Consumer>> {
        let state = self.load().await;
        Ok(billing::find_consumer(&state, consumer_id).cloned())
    }

    pub async fn insert_consumer(&self, consumer: Consumer) -> AppResult<Consumer> {
        let mut state = self.load().await;
        if billing::find_consumer(&state, consumer.consumer_id).is_some() {
            return Err(AppError::DuplicateConsumer);
        }
        state.consumers.push(consumer.clone());
        self.save(&state).await?;
        Ok(consumer)
    }

    pub async fn delete_consumer(&self, consumer_id: i64) -> AppResult<()> {
        let mut state = self.load().await;
        state.consumers.retain(|c| c.consumer_id != consumer_id);
        // Cascade: a deleted consumer takes its bills with it.
        state.bills.retain(|b| b.consumer_id != consumer_id);
        self.save(&state).await
    }

    pub async fn find_bill(
        &self,
        consumer_id: i64,
        year: i32,
        month: i32,
    ) -> AppResult<Option<Bill>> {
        let state = self.load().await;
        Ok(billing::find_bill(&state, consumer_id, year, month).cloned())
    }

    pub async fn insert_bill(&self, bill: Bill) -> AppResult<Bill> {
        let mut state = self.load().await;
        if billing::find_bill(&state, bill.consumer_id, bill.year, bill.month).is_some() {
            return Err(AppError::DuplicateBill);
        }
        state.bills.push(bill.clone());
        self.save(&state).await?;
        Ok(bill)
    }

    pub async fn delete_bill(&self, consumer_id: i64, year: i32, month: i32) -> AppResult<()> {
        let mut state = self.load().await;
        state
            .bills
            .retain(|b| !(b.consumer_id == consumer_id && b.year == year && b.month == month));
        self.save(&state).await
    }

    pub async fn previous_bills(
        &self,
        consumer_id: i64,
        year: i32,
        month: i32,
    ) -> AppResult<Vec<Bill>> {
        let state = self.load().await;
        Ok(billing::previous_bills(&state, consumer_id, year, month))
    }

    pub async fn cost_per_unit(&self) -> AppResult<f64> {
        Ok(self.load().await.cost_per_unit)
    }

    pub async fn set_cost_per_unit(&self, value: f64) -> AppResult<()> {
        let mut state = self.load().await;
        state.cost_per_unit = value;
        self.save(&state).await
    }
}
