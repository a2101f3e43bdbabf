//! Validation utilities for inventory input

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::ProductId;

/// Validate a catalog product id
pub fn validate_product_id(product_id: ProductId) -> Result<(), &'static str> {
    if product_id <= 0 {
        return Err("Product id must be positive");
    }
    Ok(())
}

/// Validate a stocked or dispatched quantity
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate that a batch does not expire before it was produced
pub fn validate_batch_dates(
    production_date: NaiveDate,
    expiry_date: NaiveDate,
) -> Result<(), &'static str> {
    if expiry_date < production_date {
        return Err("Expiry date cannot be before production date");
    }
    Ok(())
}

/// Validate the batches selected for a dispatch
pub fn validate_batch_selection(batch_ids: &[i32]) -> Result<(), &'static str> {
    if batch_ids.is_empty() {
        return Err("At least one batch must be selected");
    }
    if batch_ids.iter().any(|&id| id <= 0) {
        return Err("Batch ids must be positive");
    }
    let mut sorted = batch_ids.to_vec();
    sorted.sort_unstable();
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err("Batch ids must not repeat");
    }
    Ok(())
}
