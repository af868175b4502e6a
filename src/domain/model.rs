//! Data model
//!
//! Record types as they appear on the wire and in the JSON document.
//! Field names are part of the wire contract (`consumerID`, `mobile_no`,
//! `units_consumed`, `amt`, `cost_per_unit`).

use serde::{Deserialize, Serialize};

/// Rate applied when no setting has ever been stored
pub const DEFAULT_COST_PER_UNIT: f64 = 5.0;

/// A billable account, uniquely keyed by `consumerID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(rename = "consumerID")]
    pub consumer_id: i64,
    pub name: String,
    pub address: String,
    pub mobile_no: String,
}

/// One billing-period record, uniquely keyed by (consumerID, month, year).
///
/// `amt` is fixed at creation time from the rate then in effect and is
/// never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "consumerID")]
    pub consumer_id: i64,
    pub month: i32,
    pub year: i32,
    pub units_consumed: f64,
    pub amt: f64,
}

/// Complete snapshot of the system, as returned by `GET /state` and as
/// persisted verbatim by the file backend.
///
/// Per-field defaults keep loading lenient: a document missing any field
/// (or an empty/corrupt one) degrades to the default state instead of an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub consumers: Vec<Consumer>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default = "default_cost_per_unit")]
    pub cost_per_unit: f64,
}

fn default_cost_per_unit() -> f64 {
    DEFAULT_COST_PER_UNIT
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            consumers: Vec::new(),
            bills: Vec::new(),
            cost_per_unit: DEFAULT_COST_PER_UNIT,
        }
    }
}
