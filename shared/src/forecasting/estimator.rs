//! Demand estimator capability and post-processing of its output

use chrono::NaiveDate;

use super::calendar::weeks_after;
use crate::error::ForecastError;
use crate::models::{FeatureVector, ForecastPoint};

/// Maps feature vectors to demand estimates.
///
/// Implementations are loaded once and shared read-only across concurrent
/// report computations, so they must not hold interior mutable state.
/// The returned sequence must have the same length as `features`.
pub trait DemandEstimator: Send + Sync {
    fn estimate(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ForecastError>;

    /// Name used in logs
    fn name(&self) -> &str {
        "demand-estimator"
    }
}

/// Predicts the rolling average for every future week
#[derive(Debug, Clone, Copy, Default)]
pub struct RollingAverageBaseline;

impl DemandEstimator for RollingAverageBaseline {
    fn estimate(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ForecastError> {
        Ok(features.iter().map(|f| f.rolling_avg).collect())
    }

    fn name(&self) -> &str {
        "rolling-average-baseline"
    }
}

/// Forecast points for one product plus the number of clamped estimates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatedDemand {
    pub points: Vec<ForecastPoint>,
    pub clamped: usize,
}

/// Largest weekly estimate accepted from an estimator
pub const MAX_WEEKLY_ESTIMATE: f64 = 1e15;

/// Round an estimate to a whole quantity.
///
/// Negative and non-finite estimates become zero; the flag reports it.
pub fn to_quantity(estimate: f64) -> (u64, bool) {
    if !estimate.is_finite() || estimate < 0.0 {
        return (0, true);
    }
    // `as` saturates at u64::MAX
    (estimate.round_ties_even() as u64, false)
}

/// Run the estimator once for all of a product's feature vectors
pub fn estimate_demand(
    estimator: &dyn DemandEstimator,
    features: &[FeatureVector],
    today: NaiveDate,
) -> Result<EstimatedDemand, ForecastError> {
    let estimates = estimator.estimate(features)?;
    if estimates.len() != features.len() {
        return Err(ForecastError::EstimateLengthMismatch {
            expected: features.len(),
            actual: estimates.len(),
        });
    }
    if let Some((week_offset, &estimate)) = (0u32..)
        .zip(&estimates)
        .find(|(_, e)| e.is_finite() && **e > MAX_WEEKLY_ESTIMATE)
    {
        return Err(ForecastError::EstimateOutOfRange {
            week_offset,
            estimate,
            limit: MAX_WEEKLY_ESTIMATE,
        });
    }

    let mut clamped = 0;
    let points = estimates
        .into_iter()
        .zip(0u32..)
        .map(|(estimate, week_offset)| {
            let (predicted_quantity, was_clamped) = to_quantity(estimate);
            if was_clamped {
                clamped += 1;
            }
            ForecastPoint {
                week_offset,
                date: weeks_after(today, week_offset),
                predicted_quantity,
            }
        })
        .collect();

    Ok(EstimatedDemand { points, clamped })
}
