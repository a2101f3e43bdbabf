//! WebAssembly module for the Stockcast inventory platform
//!
//! Provides client-side computation for:
//! - Reorder planning over a weekly demand forecast
//! - Stock level and expiry classification
//! - Offline validation of stock batches

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::forecasting::{evaluate_reorder, target_week, weeks_after};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| format!("Invalid date {}: {}", raw, e))
}

fn parse_quantity(value: f64) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|e| format!("Invalid quantity {}: {}", value, e))
}

/// Reorder decision as JSON for a forecast of whole weekly quantities
pub fn plan_reorder_json(
    current_stock: f64,
    today: &str,
    weekly_demand_json: &str,
) -> Result<String, String> {
    let today = parse_date(today)?;
    let current_stock = parse_quantity(current_stock)?;
    let demand: Vec<u64> = serde_json::from_str(weekly_demand_json)
        .map_err(|e| format!("Invalid demand JSON: {}", e))?;

    let forecast: Vec<ForecastPoint> = (0u32..)
        .zip(demand)
        .map(|(week_offset, predicted_quantity)| ForecastPoint {
            week_offset,
            date: weeks_after(today, week_offset),
            predicted_quantity,
        })
        .collect();

    serde_json::to_string(&evaluate_reorder(current_stock, &forecast))
        .map_err(|e| format!("Cannot encode decision: {}", e))
}

/// Plan a reorder from current stock and a weekly demand forecast
#[wasm_bindgen]
pub fn plan_reorder(
    current_stock: f64,
    today: &str,
    weekly_demand_json: &str,
) -> Result<String, JsValue> {
    plan_reorder_json(current_stock, today, weekly_demand_json).map_err(|e| JsValue::from_str(&e))
}

/// Stock level label for a coverage percent; NaN and out-of-range input is rejected
pub fn stock_level_label(coverage_percent: f64) -> Result<String, String> {
    let coverage = Decimal::try_from(coverage_percent)
        .map_err(|e| format!("Invalid coverage {}: {}", coverage_percent, e))?;
    Ok(shared::forecasting::classify_stock_level(coverage).to_string())
}

/// Classify stock health from coverage percent
#[wasm_bindgen]
pub fn classify_stock_level(coverage_percent: f64) -> Result<String, JsValue> {
    stock_level_label(coverage_percent).map_err(|e| JsValue::from_str(&e))
}

/// Week-of-cycle number `offset` weeks after `current_week`
#[wasm_bindgen]
pub fn forecast_target_week(current_week: u32, offset: u32) -> u32 {
    target_week(current_week, offset)
}

/// Classify a batch by days left before expiry
#[wasm_bindgen]
pub fn classify_expiry_severity(days_remaining: i32) -> String {
    classify_expiry(i64::from(days_remaining)).to_string()
}

/// Validate a stock batch before submitting it; `None` when valid
#[wasm_bindgen]
pub fn validate_stock_batch(
    quantity: f64,
    production_date: &str,
    expiry_date: &str,
) -> Option<String> {
    let check = || -> Result<(), String> {
        validate_quantity(parse_quantity(quantity)?)?;
        validate_batch_dates(parse_date(production_date)?, parse_date(expiry_date)?)?;
        Ok(())
    };
    check().err()
}
