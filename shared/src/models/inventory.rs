//! Inventory management models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Batches expiring within this many days raise an alert
pub const EXPIRY_ALERT_WINDOW_DAYS: i64 = 15;

/// A stocked batch of a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub batch_id: i32,
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Current stock of a catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockSummary {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub total_quantity: Decimal,
}

/// Urgency of an expiring batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpirySeverity {
    /// 3 days or fewer
    Critical,
    /// 4 to 7 days
    Warning,
    Safe,
}

impl std::fmt::Display for ExpirySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpirySeverity::Critical => write!(f, "Critical"),
            ExpirySeverity::Warning => write!(f, "Warning"),
            ExpirySeverity::Safe => write!(f, "Safe"),
        }
    }
}

/// Classify a batch by the days left before it expires
pub fn classify_expiry(days_remaining: i64) -> ExpirySeverity {
    match days_remaining {
        i64::MIN..=3 => ExpirySeverity::Critical,
        4..=7 => ExpirySeverity::Warning,
        _ => ExpirySeverity::Safe,
    }
}

/// Whole days from `today` until `date`, negative once past
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Alert for a batch close to its expiry date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub product_name: String,
    pub batch_id: i32,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub severity: ExpirySeverity,
}

/// Batch listing entry with product name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInventoryEntry {
    pub product_name: String,
    pub batch_id: i32,
    pub quantity: Decimal,
    pub production_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub days_to_expire: i64,
}
