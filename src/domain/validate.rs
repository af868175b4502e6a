//! Field validators
//!
//! Pure, stateless predicates. Callers translate a `false` into a
//! field-specific 400 response.

use chrono::{Datelike, Utc};

/// Consumer ids are positive integers.
pub fn valid_consumer_id(id: i64) -> bool {
    id > 0
}

/// Mobile numbers are exactly 10 ASCII digits.
pub fn valid_mobile_no(mobile_no: &str) -> bool {
    mobile_no.len() == 10 && mobile_no.bytes().all(|b| b.is_ascii_digit())
}

/// Addresses must have at least 7 characters after trimming.
pub fn valid_address(address: &str) -> bool {
    address.trim().len() >= 7
}

/// Months are 1 through 12.
pub fn valid_month(month: i32) -> bool {
    (1..=12).contains(&month)
}

/// Years run from 2000 through the current wall-clock year.
pub fn valid_year(year: i32) -> bool {
    year >= 2000 && year <= Utc::now().year()
}
