//! Feature construction for the demand estimator

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::aggregation::WeeklySeries;
use super::calendar::{iso_week, target_week, week_start};
use crate::models::{FeatureVector, RecentObservation};
use crate::types::ProductId;

/// Weeks forecasted per report
pub const FORECAST_HORIZON_WEEKS: u32 = 5;

/// Past weekly totals shown on a report
pub const RECENT_OBSERVATION_COUNT: usize = 5;

/// Weeks averaged into the rolling-average feature
pub const ROLLING_WINDOW_WEEKS: usize = 4;

/// Everything derived from history for one product report
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub current_week: u32,
    pub lag: f64,
    pub rolling_avg: f64,
    /// Oldest first, left-padded to `RECENT_OBSERVATION_COUNT`
    pub recent_observations: Vec<RecentObservation>,
    /// One per forecast week offset
    pub vectors: Vec<FeatureVector>,
}

/// Demand of the week before today's week, else the latest week, else zero
pub fn lag_feature(series: &WeeklySeries, today: NaiveDate) -> Decimal {
    let previous_week = week_start(today) - Duration::weeks(1);
    series
        .total_for(previous_week)
        .or_else(|| series.latest().map(|b| b.total_quantity))
        .unwrap_or(Decimal::ZERO)
}

/// Mean of the last (up to) four weekly totals, `fallback` with no history
pub fn rolling_average(series: &WeeklySeries, fallback: Decimal) -> Decimal {
    let window = series.tail(ROLLING_WINDOW_WEEKS);
    if window.is_empty() {
        return fallback;
    }
    let sum: Decimal = window.iter().map(|b| b.total_quantity).sum();
    sum / Decimal::from(window.len())
}

/// Last weekly totals, left-padded with the "no data" sentinel
pub fn recent_observations(series: &WeeklySeries) -> Vec<RecentObservation> {
    let observed = series.tail(RECENT_OBSERVATION_COUNT);
    let mut observations =
        vec![RecentObservation::padding(); RECENT_OBSERVATION_COUNT - observed.len()];
    observations.extend(
        observed
            .iter()
            .map(|b| RecentObservation::observed(b.week_start, b.total_quantity)),
    );
    observations
}

/// Build the estimator inputs for the next `FORECAST_HORIZON_WEEKS` weeks
pub fn build_features(product_id: ProductId, series: &WeeklySeries, today: NaiveDate) -> FeatureSet {
    let current_week = iso_week(today);
    let lag = lag_feature(series, today);
    let rolling_avg = rolling_average(series, lag);

    let lag = lag.to_f64().unwrap_or(0.0);
    let rolling_avg = rolling_avg.to_f64().unwrap_or(0.0);

    let vectors = (0..FORECAST_HORIZON_WEEKS)
        .map(|offset| FeatureVector {
            product_id,
            target_week: target_week(current_week, offset),
            lag,
            rolling_avg,
        })
        .collect();

    FeatureSet {
        current_week,
        lag,
        rolling_avg,
        recent_observations: recent_observations(series),
        vectors,
    }
}
