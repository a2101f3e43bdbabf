//! Common types used across the platform

use chrono::NaiveDate;
use serde::Serializer;

/// Catalog identifier of a product
pub type ProductId = i32;

/// Wire format for every emitted calendar date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Label emitted in place of a missing date
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format an optional date, using "N/A" when absent
pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Serde helper writing `Option<NaiveDate>` as a date string or "N/A"
pub fn serialize_optional_date<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_optional_date(*date))
}
