//! Demand forecasting and reorder policy
//!
//! Data flows strictly forward:
//! sales history -> weekly series -> features -> estimator -> reorder policy -> report.
//! Every step is a pure function over request-scoped values; the estimator is
//! the only long-lived collaborator and is shared read-only.

pub mod aggregation;
pub mod calendar;
pub mod estimator;
pub mod features;
pub mod policy;
pub mod report;

pub use aggregation::{aggregate_weekly, WeeklySeries};
pub use calendar::{iso_week, target_week, week_start, weeks_after};
pub use estimator::{
    estimate_demand, to_quantity, DemandEstimator, EstimatedDemand, RollingAverageBaseline,
    MAX_WEEKLY_ESTIMATE,
};
pub use features::{
    build_features, FeatureSet, FORECAST_HORIZON_WEEKS, RECENT_OBSERVATION_COUNT,
    ROLLING_WINDOW_WEEKS,
};
pub use policy::{classify_stock_level, coverage_percent, evaluate_reorder, reorder_offset};
pub use report::{assemble_batch, build_product_report, ProductSnapshot};
