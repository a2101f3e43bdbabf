//! Errors raised by the forecasting core

use thiserror::Error;

use crate::models::FailureKind;

/// Per-product forecasting failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Data access failed: {0}")]
    DataAccess(String),

    #[error("Demand estimator failed: {0}")]
    Estimator(String),

    #[error("Demand estimator returned {actual} estimates for {expected} feature vectors")]
    EstimateLengthMismatch { expected: usize, actual: usize },

    #[error("Demand estimate {estimate} for week offset {week_offset} exceeds {limit}")]
    EstimateOutOfRange {
        week_offset: u32,
        estimate: f64,
        limit: f64,
    },
}

impl ForecastError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ForecastError::DataAccess(_) => FailureKind::DataAccess,
            ForecastError::Estimator(_)
            | ForecastError::EstimateLengthMismatch { .. }
            | ForecastError::EstimateOutOfRange { .. } => FailureKind::Estimator,
        }
    }
}
