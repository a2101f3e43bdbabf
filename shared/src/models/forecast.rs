//! Demand forecast and reorder models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::types::{serialize_optional_date, ProductId};

/// Model input for one forecasted week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub product_id: ProductId,
    /// Week of year in the 1..=52 cycle
    pub target_week: u32,
    pub lag: f64,
    pub rolling_avg: f64,
}

/// One week of a product's demand forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub week_offset: u32,
    pub date: NaiveDate,
    pub predicted_quantity: u64,
}

/// A past weekly sales total, or padding when history is short
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentObservation {
    #[serde(serialize_with = "serialize_optional_date")]
    pub week_start: Option<NaiveDate>,
    pub quantity: Decimal,
}

impl RecentObservation {
    pub fn observed(week_start: NaiveDate, quantity: Decimal) -> Self {
        Self {
            week_start: Some(week_start),
            quantity,
        }
    }

    /// The "no data" sentinel
    pub fn padding() -> Self {
        Self {
            week_start: None,
            quantity: Decimal::ZERO,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.week_start.is_none()
    }
}

/// Coarse stock health over the forecast horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    /// Coverage of at least 100%
    Sufficient,
    /// Coverage of 70% up to 100%
    Moderate,
    /// Coverage below 70%
    Critical,
}

impl StockLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::Sufficient => "Sufficient",
            StockLevel::Moderate => "Moderate",
            StockLevel::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When and how much to reorder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderDecision {
    #[serde(rename = "reorder_needed")]
    pub needed: bool,
    /// Weeks from today, one week ahead of projected stock-out
    #[serde(rename = "reorder_week_offset")]
    pub week_offset: Option<u32>,
    #[serde(rename = "reorder_date", serialize_with = "serialize_optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "reorder_quantity")]
    pub quantity: Decimal,
    pub total_forecasted: u64,
    pub coverage_percent: Decimal,
    pub stock_level: StockLevel,
}

/// Forecast and reorder report for a single product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductForecastReport {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub current_stock: Decimal,
    /// ISO week number of the report date
    pub week: u32,
    pub forecast: Vec<ForecastPoint>,
    pub past_sales: Vec<RecentObservation>,
    #[serde(flatten)]
    pub reorder: ReorderDecision,
    /// Estimator outputs that were negative or non-finite and forced to zero
    pub clamped_estimates: usize,
}

/// Why a product is missing from a forecast batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DataAccess,
    Estimator,
}

/// A product whose report could not be built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductForecastFailure {
    pub product_id: ProductId,
    pub kind: FailureKind,
    pub message: String,
}

/// Forecast reports for a whole catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastBatch {
    pub as_of: NaiveDate,
    pub iso_week: u32,
    pub reports: Vec<ProductForecastReport>,
    pub failures: Vec<ProductForecastFailure>,
}

impl ForecastBatch {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            iso_week: crate::forecasting::calendar::iso_week(as_of),
            reports: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record the outcome for one product
    pub fn record(
        &mut self,
        product_id: ProductId,
        outcome: Result<ProductForecastReport, ForecastError>,
    ) {
        match outcome {
            Ok(report) => self.reports.push(report),
            Err(e) => self.failures.push(ProductForecastFailure {
                product_id,
                kind: e.kind(),
                message: e.to_string(),
            }),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
