//! Billing rules
//!
//! Amount calculation and the previous-bills lookback, as pure functions
//! over in-memory state. The file backend runs these directly against the
//! loaded document; clients can use them as a local mirror of the server
//! queries.

use super::model::{AppState, Bill, Consumer};

/// Number of prior billing periods returned by the lookback query.
pub const PREVIOUS_BILLS_LIMIT: usize = 3;

/// `amt = units * cost_per_unit`. No rounding; display formatting is a
/// presentation concern.
pub fn calculate_amount(units: f64, cost_per_unit: f64) -> f64 {
    units * cost_per_unit
}

/// Look up a consumer by id.
pub fn find_consumer(state: &AppState, consumer_id: i64) -> Option<&Consumer> {
    state
        .consumers
        .iter()
        .find(|c| c.consumer_id == consumer_id)
}

/// Look up a bill by its (consumerID, month, year) key.
pub fn find_bill(state: &AppState, consumer_id: i64, year: i32, month: i32) -> Option<&Bill> {
    state
        .bills
        .iter()
        .find(|b| b.consumer_id == consumer_id && b.year == year && b.month == month)
}

/// Up to 3 most recent bills strictly before the target (year, month),
/// newest first.
///
/// This is a "most recent prior records" query: gaps in the billing
/// history are not detected, so the returned periods need not be
/// consecutive months.
pub fn previous_bills(state: &AppState, consumer_id: i64, year: i32, month: i32) -> Vec<Bill> {
    let mut past: Vec<Bill> = state
        .bills
        .iter()
        .filter(|b| {
            b.consumer_id == consumer_id
                && (b.year < year || (b.year == year && b.month < month))
        })
        .cloned()
        .collect();
    past.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
    past.truncate(PREVIOUS_BILLS_LIMIT);
    past
}

/// Presentation-only currency formatting: rupee symbol, two decimals.
pub fn format_inr(value: f64) -> String {
    format!("\u{20b9}{value:.2}")
}
