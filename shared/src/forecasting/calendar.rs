//! Calendar helpers for weekly demand

use chrono::{Datelike, Duration, NaiveDate};

/// Week numbers cycle through 1..=52; ISO week 53 folds into week 1
pub const WEEKS_PER_CYCLE: u32 = 52;

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// ISO 8601 week number (1..=53)
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Week-of-year fed to the estimator for a forecast `offset` weeks ahead
pub fn target_week(current_iso_week: u32, offset: u32) -> u32 {
    (current_iso_week + offset + WEEKS_PER_CYCLE - 1) % WEEKS_PER_CYCLE + 1
}

/// The date `weeks` whole weeks after `date`
pub fn weeks_after(date: NaiveDate, weeks: u32) -> NaiveDate {
    date + Duration::weeks(i64::from(weeks))
}
