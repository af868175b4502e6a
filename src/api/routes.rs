//! API Routes
//!
//! HTTP endpoint definitions. Every request body is checked by a
//! `validate()` that produces a typed record before any business logic or
//! persistence access runs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{billing, validate, AppState, Bill, Consumer};
use crate::error::AppError;
use crate::store::Store;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateConsumerRequest {
    #[serde(rename = "consumerID")]
    pub consumer_id: i64,
    pub name: String,
    pub address: String,
    pub mobile_no: String,
}

impl CreateConsumerRequest {
    /// Field-by-field validation producing the record to store.
    /// Stored fields are trimmed.
    pub fn validate(self) -> Result<Consumer, AppError> {
        if !validate::valid_consumer_id(self.consumer_id) {
            return Err(AppError::Validation("Invalid consumerID".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Invalid name".to_string()));
        }
        if !validate::valid_address(&self.address) {
            return Err(AppError::Validation(
                "Invalid address (min 7 chars)".to_string(),
            ));
        }
        if !validate::valid_mobile_no(self.mobile_no.trim()) {
            return Err(AppError::Validation(
                "Invalid mobile_no (10 digits)".to_string(),
            ));
        }

        Ok(Consumer {
            consumer_id: self.consumer_id,
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            mobile_no: self.mobile_no.trim().to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBillRequest {
    #[serde(rename = "consumerID")]
    pub consumer_id: i64,
    pub month: i32,
    pub year: i32,
    pub units_consumed: f64,
}

/// A bill request that passed validation; `amt` is still to be computed
/// from the rate in effect.
#[derive(Debug)]
pub struct NewBill {
    pub consumer_id: i64,
    pub month: i32,
    pub year: i32,
    pub units_consumed: f64,
}

impl CreateBillRequest {
    pub fn validate(self) -> Result<NewBill, AppError> {
        if !validate::valid_consumer_id(self.consumer_id) {
            return Err(AppError::Validation("Invalid consumerID".to_string()));
        }
        if !validate::valid_month(self.month) {
            return Err(AppError::Validation("Invalid month (1-12)".to_string()));
        }
        if !validate::valid_year(self.year) {
            return Err(AppError::Validation("Invalid year".to_string()));
        }
        if !self.units_consumed.is_finite() || self.units_consumed <= 0.0 {
            return Err(AppError::Validation("Invalid units_consumed".to_string()));
        }

        Ok(NewBill {
            consumer_id: self.consumer_id,
            month: self.month,
            year: self.year,
            units_consumed: self.units_consumed,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetCostPerUnitRequest {
    #[serde(default)]
    pub value: Option<f64>,
    /// Legacy alias for `value`
    #[serde(default)]
    pub cpu: Option<f64>,
}

impl SetCostPerUnitRequest {
    /// `value` wins over the legacy `cpu` alias; must be finite and > 0.
    pub fn validate(self) -> Result<f64, AppError> {
        let value = self
            .value
            .or(self.cpu)
            .ok_or_else(|| AppError::Validation("Invalid value".to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::Validation("Invalid value".to_string()));
        }
        Ok(value)
    }
}

#[derive(Debug, Serialize)]
pub struct CostPerUnitResponse {
    pub cost_per_unit: f64,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<Store> {
    Router::new()
        .route("/state", get(get_state))
        .route("/consumer", post(create_consumer))
        .route(
            "/consumer/:id",
            get(get_consumer).delete(delete_consumer),
        )
        .route("/bill", post(create_bill))
        .route(
            "/bill/:consumer_id/:year/:month",
            get(get_bill).delete(delete_bill),
        )
        .route(
            "/bills/previous/:consumer_id/:year/:month",
            get(get_previous_bills),
        )
        .route(
            "/settings/cost-per-unit",
            get(get_cost_per_unit)
                .put(set_cost_per_unit)
                .patch(set_cost_per_unit),
        )
}

// =========================================================================
// GET /state
// =========================================================================

/// Full snapshot: consumers, bills and the current rate
async fn get_state(State(store): State<Store>) -> Result<Json<AppState>, AppError> {
    Ok(Json(store.state().await?))
}

// =========================================================================
// POST /consumer
// =========================================================================

/// Create a consumer; 409 if the id is already taken
async fn create_consumer(
    State(store): State<Store>,
    Json(request): Json<CreateConsumerRequest>,
) -> Result<(StatusCode, Json<Consumer>), AppError> {
    let consumer = request.validate()?;
    let consumer = store.insert_consumer(consumer).await?;

    Ok((StatusCode::CREATED, Json(consumer)))
}

// =========================================================================
// GET /consumer/:id
// =========================================================================

async fn get_consumer(
    State(store): State<Store>,
    Path(consumer_id): Path<i64>,
) -> Result<Json<Consumer>, AppError> {
    let consumer = store
        .find_consumer(consumer_id)
        .await?
        .ok_or(AppError::ConsumerNotFound)?;

    Ok(Json(consumer))
}

// =========================================================================
// DELETE /consumer/:id
// =========================================================================

/// Delete a consumer and cascade-delete its bills. Idempotent: deleting a
/// nonexistent id is still a success.
async fn delete_consumer(
    State(store): State<Store>,
    Path(consumer_id): Path<i64>,
) -> Result<Json<OkResponse>, AppError> {
    store.delete_consumer(consumer_id).await?;

    Ok(Json(OkResponse { ok: true }))
}

// =========================================================================
// POST /bill
// =========================================================================

/// Create a bill for an existing consumer. `amt` is computed here from the
/// rate currently in effect and never recomputed afterward.
async fn create_bill(
    State(store): State<Store>,
    Json(request): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<Bill>), AppError> {
    let new_bill = request.validate()?;

    if store.find_consumer(new_bill.consumer_id).await?.is_none() {
        return Err(AppError::ConsumerNotFound);
    }

    let cost_per_unit = store.cost_per_unit().await?;
    let amt = billing::calculate_amount(new_bill.units_consumed, cost_per_unit);

    let bill = store
        .insert_bill(Bill {
            consumer_id: new_bill.consumer_id,
            month: new_bill.month,
            year: new_bill.year,
            units_consumed: new_bill.units_consumed,
            amt,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(bill)))
}

// =========================================================================
// GET /bill/:consumerID/:year/:month
// =========================================================================

async fn get_bill(
    State(store): State<Store>,
    Path((consumer_id, year, month)): Path<(i64, i32, i32)>,
) -> Result<Json<Bill>, AppError> {
    let bill = store
        .find_bill(consumer_id, year, month)
        .await?
        .ok_or(AppError::BillNotFound)?;

    Ok(Json(bill))
}

// =========================================================================
// DELETE /bill/:consumerID/:year/:month
// =========================================================================

/// Idempotent delete by (consumerID, year, month)
async fn delete_bill(
    State(store): State<Store>,
    Path((consumer_id, year, month)): Path<(i64, i32, i32)>,
) -> Result<Json<OkResponse>, AppError> {
    store.delete_bill(consumer_id, year, month).await?;

    Ok(Json(OkResponse { ok: true }))
}

// =========================================================================
// GET /bills/previous/:consumerID/:year/:month
// =========================================================================

/// Up to 3 most recent bills strictly before the given period, newest
/// first
async fn get_previous_bills(
    State(store): State<Store>,
    Path((consumer_id, year, month)): Path<(i64, i32, i32)>,
) -> Result<Json<Vec<Bill>>, AppError> {
    let bills = store.previous_bills(consumer_id, year, month).await?;

    Ok(Json(bills))
}

// =========================================================================
// GET|PUT|PATCH /settings/cost-per-unit
// =========================================================================

async fn get_cost_per_unit(
    State(store): State<Store>,
) -> Result<Json<CostPerUnitResponse>, AppError> {
    let cost_per_unit = store.cost_per_unit().await?;

    Ok(Json(CostPerUnitResponse { cost_per_unit }))
}

/// Set the global rate. Only affects bills created afterward.
async fn set_cost_per_unit(
    State(store): State<Store>,
    Json(request): Json<SetCostPerUnitRequest>,
) -> Result<Json<CostPerUnitResponse>, AppError> {
    let value = request.validate()?;
    store.set_cost_per_unit(value).await?;

    Ok(Json(CostPerUnitResponse {
        cost_per_unit: value,
    }))
}
