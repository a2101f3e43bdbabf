//! Sales history models

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A recorded sale of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub product_id: ProductId,
    pub date: NaiveDate,
    /// `None` when the stored quantity is not a number
    pub quantity: Option<Decimal>,
}

impl SaleEvent {
    pub fn new(product_id: ProductId, date: NaiveDate, quantity: Decimal) -> Self {
        Self {
            product_id,
            date,
            quantity: Some(quantity),
        }
    }

    /// Build a sale from a stored quantity that may not parse
    pub fn from_raw(product_id: ProductId, date: NaiveDate, raw_quantity: Option<&str>) -> Self {
        Self {
            product_id,
            date,
            quantity: raw_quantity.and_then(|raw| Decimal::from_str(raw.trim()).ok()),
        }
    }

    /// Quantity this sale adds to its weekly bucket.
    ///
    /// Unparseable and negative quantities count as zero.
    pub fn effective_quantity(&self) -> Decimal {
        match self.quantity {
            Some(quantity) if quantity > Decimal::ZERO => quantity,
            _ => Decimal::ZERO,
        }
    }
}

/// Sales total for one Monday-aligned week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub week_start: NaiveDate,
    pub total_quantity: Decimal,
}
