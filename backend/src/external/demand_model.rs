//! Demand model loaded from a coefficient file
//!
//! The model is read once at startup and never mutated afterwards, so a
//! single instance is shared by every concurrent forecast request.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use shared::forecasting::{DemandEstimator, RollingAverageBaseline};
use shared::{FeatureVector, ForecastError, ProductId};

use crate::config::ForecastConfig;
use crate::error::{AppError, AppResult};

/// Linear demand model over the lag, rolling-average and week features
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LinearDemandModel {
    pub intercept: f64,
    pub lag_coefficient: f64,
    pub rolling_avg_coefficient: f64,
    #[serde(default)]
    pub week_coefficient: f64,
    /// Additive offset per product
    #[serde(default)]
    pub product_intercepts: HashMap<ProductId, f64>,
    /// Multiplicative factor per target week (1..=52)
    #[serde(default)]
    pub seasonal_factors: HashMap<u32, f64>,
}

impl LinearDemandModel {
    /// Parse and check a model from its JSON form
    pub fn from_json(json: &str) -> AppResult<Self> {
        let model: LinearDemandModel = serde_json::from_str(json)
            .map_err(|e| AppError::DemandModel(format!("Invalid model file: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON coefficient file
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::DemandModel(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> AppResult<()> {
        let coefficients = [
            self.intercept,
            self.lag_coefficient,
            self.rolling_avg_coefficient,
            self.week_coefficient,
        ];
        if coefficients
            .iter()
            .chain(self.product_intercepts.values())
            .any(|c| !c.is_finite())
        {
            return Err(AppError::DemandModel(
                "Coefficients must be finite numbers".to_string(),
            ));
        }

        for (week, factor) in &self.seasonal_factors {
            if !(1..=52).contains(week) {
                return Err(AppError::DemandModel(format!(
                    "Seasonal factor for week {} is outside 1..=52",
                    week
                )));
            }
            if !factor.is_finite() || *factor < 0.0 {
                return Err(AppError::DemandModel(format!(
                    "Seasonal factor for week {} must be non-negative",
                    week
                )));
            }
        }
        Ok(())
    }

    fn predict(&self, features: &FeatureVector) -> f64 {
        let base = self.intercept
            + self
                .product_intercepts
                .get(&features.product_id)
                .copied()
                .unwrap_or(0.0)
            + self.lag_coefficient * features.lag
            + self.rolling_avg_coefficient * features.rolling_avg
            + self.week_coefficient * f64::from(features.target_week);

        base * self
            .seasonal_factors
            .get(&features.target_week)
            .copied()
            .unwrap_or(1.0)
    }
}

impl DemandEstimator for LinearDemandModel {
    fn estimate(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ForecastError> {
        Ok(features.iter().map(|f| self.predict(f)).collect())
    }

    fn name(&self) -> &str {
        "linear-demand-model"
    }
}

/// Build the estimator configured for this process
pub fn load_estimator(config: &ForecastConfig) -> AppResult<Arc<dyn DemandEstimator>> {
    match &config.model_path {
        Some(path) => {
            let model = LinearDemandModel::from_file(path)?;
            tracing::info!(
                "Loaded demand model from {} ({} product offsets, {} seasonal factors)",
                path,
                model.product_intercepts.len(),
                model.seasonal_factors.len()
            );
            Ok(Arc::new(model))
        }
        None => {
            tracing::warn!("No demand model configured, using rolling-average baseline");
            Ok(Arc::new(RollingAverageBaseline))
        }
    }
}
