//! Per-product forecast report assembly

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::aggregation::aggregate_weekly;
use super::estimator::{estimate_demand, DemandEstimator};
use super::features::build_features;
use super::policy::evaluate_reorder;
use crate::error::ForecastError;
use crate::models::{ForecastBatch, ProductForecastReport, SaleEvent};
use crate::types::ProductId;

/// Stored state of one catalog product needed for a report
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub sales: Vec<SaleEvent>,
}

/// History -> features -> estimator -> reorder policy for one product
pub fn build_product_report(
    snapshot: &ProductSnapshot,
    today: NaiveDate,
    estimator: &dyn DemandEstimator,
) -> Result<ProductForecastReport, ForecastError> {
    let series = aggregate_weekly(&snapshot.sales, today);
    let features = build_features(snapshot.product_id, &series, today);
    let demand = estimate_demand(estimator, &features.vectors, today)?;
    let reorder = evaluate_reorder(snapshot.current_stock, &demand.points);

    Ok(ProductForecastReport {
        product_id: snapshot.product_id,
        product_name: snapshot.product_name.clone(),
        unit: snapshot.unit.clone(),
        current_stock: snapshot.current_stock,
        week: features.current_week,
        forecast: demand.points,
        past_sales: features.recent_observations,
        reorder,
        clamped_estimates: demand.clamped,
    })
}

/// Build reports for every catalog entry.
///
/// `Ok(None)` marks an id with no catalog row and is skipped. Errors are
/// kept per product and never stop the remaining entries.
pub fn assemble_batch<I>(
    today: NaiveDate,
    entries: I,
    estimator: &dyn DemandEstimator,
) -> ForecastBatch
where
    I: IntoIterator<Item = (ProductId, Result<Option<ProductSnapshot>, ForecastError>)>,
{
    let mut batch = ForecastBatch::new(today);
    for (product_id, entry) in entries {
        let outcome = match entry {
            Ok(Some(snapshot)) => build_product_report(&snapshot, today, estimator),
            Ok(None) => continue,
            Err(e) => Err(e),
        };
        batch.record(product_id, outcome);
    }
    batch
}
