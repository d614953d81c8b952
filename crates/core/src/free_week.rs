//! Calendar-week arithmetic for the free-tier allowance.
//!
//! The allowance is one free publication per user per calendar week,
//! keyed by the Monday that starts the week.

use chrono::{Datelike, Duration, NaiveDate};

use crate::types::Timestamp;

/// The Monday starting the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(days_from_monday)
}

/// The Monday starting the week containing the given instant (UTC).
pub fn week_start_of(ts: Timestamp) -> NaiveDate {
    week_start(ts.date_naive())
}
