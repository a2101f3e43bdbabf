//! Demand forecasting tests
//!
//! Tests for the forecast pipeline including:
//! - Weekly aggregation against a brute-force grouping
//! - Lag and rolling-average features
//! - Reorder decisions and stock levels
//! - Per-product failure isolation within a batch

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::forecasting::{
    aggregate_weekly, assemble_batch, build_product_report, evaluate_reorder, week_start,
    weeks_after, DemandEstimator, ProductSnapshot, RollingAverageBaseline,
};
use shared::{
    FailureKind, FeatureVector, ForecastError, ForecastPoint, ProductId, SaleEvent, StockLevel,
};
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Thursday of ISO week 24
fn today() -> NaiveDate {
    date(2024, 6, 13)
}

fn snapshot(product_id: ProductId, stock: i64, sales: Vec<SaleEvent>) -> ProductSnapshot {
    ProductSnapshot {
        product_id,
        product_name: format!("Product {}", product_id),
        unit: "kg".to_string(),
        current_stock: Decimal::from(stock),
        sales,
    }
}

/// Returns the same estimates for every product
struct FixedEstimator(Vec<f64>);

impl DemandEstimator for FixedEstimator {
    fn estimate(&self, _features: &[FeatureVector]) -> Result<Vec<f64>, ForecastError> {
        Ok(self.0.clone())
    }
}

/// Fails for one product, rolling average for the rest
struct FailingFor(ProductId);

impl DemandEstimator for FailingFor {
    fn estimate(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ForecastError> {
        if features.iter().any(|f| f.product_id == self.0) {
            return Err(ForecastError::Estimator("model unavailable".to_string()));
        }
        RollingAverageBaseline.estimate(features)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Flat demand of three a week against ten in stock
    #[test]
    fn test_flat_demand_scenarios() {
        let estimator = FixedEstimator(vec![3.0; 5]);

        let short = build_product_report(&snapshot(1, 10, vec![]), today(), &estimator).unwrap();
        assert!(short.reorder.needed);
        assert_eq!(short.reorder.week_offset, Some(2));
        assert_eq!(short.reorder.quantity, Decimal::from(5));
        assert_eq!(short.reorder.coverage_percent, Decimal::new(6667, 2));
        assert_eq!(short.reorder.stock_level, StockLevel::Critical);

        let covered = build_product_report(&snapshot(1, 20, vec![]), today(), &estimator).unwrap();
        assert!(!covered.reorder.needed);
        assert_eq!(covered.reorder.quantity, Decimal::ZERO);
        assert_eq!(covered.reorder.coverage_percent, Decimal::new(13333, 2));
        assert_eq!(covered.reorder.stock_level, StockLevel::Sufficient);
    }

    /// Stock runs out during the third forecast week
    #[test]
    fn test_reorder_before_stock_out() {
        let estimator = FixedEstimator(vec![30.0, 40.0, 50.0, 20.0, 10.0]);
        let report = build_product_report(&snapshot(1, 100, vec![]), today(), &estimator).unwrap();

        assert_eq!(report.week, 24);
        assert_eq!(report.reorder.total_forecasted, 150);
        assert!(report.reorder.needed);
        assert_eq!(report.reorder.week_offset, Some(1));
        assert_eq!(report.reorder.date, Some(date(2024, 6, 20)));
        assert_eq!(report.reorder.quantity, Decimal::from(50));
        assert_eq!(report.reorder.coverage_percent, Decimal::new(6667, 2));
        assert_eq!(report.reorder.stock_level, StockLevel::Critical);
    }

    /// Stock covers the whole horizon
    #[test]
    fn test_no_reorder_when_stock_covers_demand() {
        let estimator = FixedEstimator(vec![10.0, 20.0, 30.0, 20.0, 10.0]);
        let report = build_product_report(&snapshot(1, 120, vec![]), today(), &estimator).unwrap();

        assert!(!report.reorder.needed);
        assert_eq!(report.reorder.week_offset, None);
        assert_eq!(report.reorder.date, None);
        assert_eq!(report.reorder.quantity, Decimal::ZERO);
        assert_eq!(report.reorder.coverage_percent, Decimal::new(13333, 2));
        assert_eq!(report.reorder.stock_level, StockLevel::Sufficient);
    }

    /// Empty history yields a zero forecast and padded past sales
    #[test]
    fn test_empty_history_report() {
        let report =
            build_product_report(&snapshot(4, 0, vec![]), today(), &RollingAverageBaseline)
                .unwrap();

        assert!(report.forecast.iter().all(|p| p.predicted_quantity == 0));
        assert!(!report.reorder.needed);
        assert_eq!(report.reorder.coverage_percent, Decimal::ONE_HUNDRED);
        assert_eq!(report.reorder.stock_level, StockLevel::Sufficient);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["reorder_needed"], false);
        assert_eq!(json["reorder_date"], "N/A");
        let past = json["past_sales"].as_array().unwrap();
        assert_eq!(past.len(), 5);
        assert!(past.iter().all(|o| o["week_start"] == "N/A"));
    }

    /// Forecast dates step one week from today
    #[test]
    fn test_forecast_dates() {
        let report =
            build_product_report(&snapshot(4, 10, vec![]), today(), &RollingAverageBaseline)
                .unwrap();

        let dates: Vec<NaiveDate> = report.forecast.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 6, 13),
                date(2024, 6, 20),
                date(2024, 6, 27),
                date(2024, 7, 4),
                date(2024, 7, 11),
            ]
        );
    }

    /// Lag is the total of the week before today's week
    #[test]
    fn test_previous_week_lag_drives_forecast() {
        let sales = vec![
            SaleEvent::new(2, date(2024, 6, 3), Decimal::from(12)),
            SaleEvent::new(2, date(2024, 6, 5), Decimal::from(8)),
            SaleEvent::new(2, date(2024, 6, 11), Decimal::from(50)),
        ];

        struct LagOnly;
        impl DemandEstimator for LagOnly {
            fn estimate(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ForecastError> {
                Ok(features.iter().map(|f| f.lag).collect())
            }
        }

        let report = build_product_report(&snapshot(2, 1000, sales), today(), &LagOnly).unwrap();
        assert!(report.forecast.iter().all(|p| p.predicted_quantity == 20));
    }

    /// Sales after the evaluation date are ignored
    #[test]
    fn test_future_sales_ignored() {
        let sales = vec![
            SaleEvent::new(2, date(2024, 6, 10), Decimal::from(4)),
            SaleEvent::new(2, date(2024, 6, 14), Decimal::from(400)),
        ];
        let report =
            build_product_report(&snapshot(2, 1000, sales), today(), &RollingAverageBaseline)
                .unwrap();

        assert!(report.forecast.iter().all(|p| p.predicted_quantity == 4));
    }

    /// Unparseable quantities contribute nothing
    #[test]
    fn test_unparseable_quantities() {
        let sales = vec![
            SaleEvent::from_raw(2, date(2024, 6, 10), Some("7")),
            SaleEvent::from_raw(2, date(2024, 6, 10), Some("seven")),
            SaleEvent::from_raw(2, date(2024, 6, 11), None),
        ];
        let series = aggregate_weekly(&sales, today());

        assert_eq!(series.total_for(date(2024, 6, 10)), Some(Decimal::from(7)));
    }

    /// Negative and non-finite estimates are clamped and counted
    #[test]
    fn test_clamped_estimates() {
        let estimator = FixedEstimator(vec![-3.0, f64::NAN, 2.5, 3.5, f64::INFINITY]);
        let report = build_product_report(&snapshot(1, 100, vec![]), today(), &estimator).unwrap();

        let quantities: Vec<u64> = report.forecast.iter().map(|p| p.predicted_quantity).collect();
        assert_eq!(quantities, vec![0, 0, 2, 4, 0]);
        assert_eq!(report.clamped_estimates, 3);
    }

    /// An implausibly large estimate fails only its own product
    #[test]
    fn test_oversized_estimate_isolated() {
        struct HugeFor(ProductId);
        impl DemandEstimator for HugeFor {
            fn estimate(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ForecastError> {
                let value = if features.iter().any(|f| f.product_id == self.0) {
                    5e18
                } else {
                    2.0
                };
                Ok(vec![value; features.len()])
            }
        }

        let entries = vec![
            (1, Ok(Some(snapshot(1, 10, vec![])))),
            (2, Ok(Some(snapshot(2, 10, vec![])))),
        ];
        let batch = assemble_batch(today(), entries, &HugeFor(2));

        assert_eq!(batch.reports.len(), 1);
        assert_eq!(batch.reports[0].product_id, 1);
        assert_eq!(batch.reports[0].reorder.total_forecasted, 10);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].product_id, 2);
        assert_eq!(batch.failures[0].kind, FailureKind::Estimator);
    }

    /// One failing product does not block the others
    #[test]
    fn test_failure_isolation() {
        let sales = vec![SaleEvent::new(0, date(2024, 6, 10), Decimal::from(5))];
        let entries = vec![
            (1, Ok(Some(snapshot(1, 10, sales.clone())))),
            (2, Ok(Some(snapshot(2, 10, sales.clone())))),
            (3, Err(ForecastError::DataAccess("connection reset".to_string()))),
            (4, Ok(None)),
            (5, Ok(Some(snapshot(5, 10, sales)))),
        ];

        let batch = assemble_batch(today(), entries, &FailingFor(2));

        let reported: Vec<ProductId> = batch.reports.iter().map(|r| r.product_id).collect();
        assert_eq!(reported, vec![1, 5]);
        assert_eq!(batch.failures.len(), 2);
        assert_eq!(batch.failures[0].product_id, 2);
        assert_eq!(batch.failures[0].kind, FailureKind::Estimator);
        assert_eq!(batch.failures[1].product_id, 3);
        assert_eq!(batch.failures[1].kind, FailureKind::DataAccess);
        assert!(!batch.is_complete());
        assert_eq!(batch.iso_week, 24);
    }

    /// An estimator returning the wrong number of estimates fails that product
    #[test]
    fn test_estimate_length_mismatch() {
        let estimator = FixedEstimator(vec![1.0, 2.0, 3.0]);
        let result = build_product_report(&snapshot(1, 10, vec![]), today(), &estimator);

        assert_eq!(
            result,
            Err(ForecastError::EstimateLengthMismatch {
                expected: 5,
                actual: 3
            })
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for sales within roughly a year before `today()`
    fn sales_strategy() -> impl Strategy<Value = Vec<SaleEvent>> {
        prop::collection::vec((0i64..400, 0i64..1000), 0..60).prop_map(|raw| {
            raw.into_iter()
                .map(|(days_back, qty)| {
                    SaleEvent::new(
                        1,
                        today() - Duration::days(days_back - 20),
                        Decimal::new(qty, 1),
                    )
                })
                .collect()
        })
    }

    /// Strategy for a five-week forecast
    fn forecast_strategy() -> impl Strategy<Value = Vec<ForecastPoint>> {
        prop::collection::vec(0u64..200, 5).prop_map(|quantities| {
            (0u32..)
                .zip(quantities)
                .map(|(week_offset, predicted_quantity)| ForecastPoint {
                    week_offset,
                    date: weeks_after(today(), week_offset),
                    predicted_quantity,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Weekly totals match a brute-force grouping of past sales
        #[test]
        fn prop_aggregation_matches_grouping(sales in sales_strategy()) {
            let mut expected: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
            for sale in sales.iter().filter(|s| s.date <= today()) {
                *expected.entry(week_start(sale.date)).or_insert(Decimal::ZERO) +=
                    sale.effective_quantity();
            }

            let series = aggregate_weekly(&sales, today());
            let actual: BTreeMap<NaiveDate, Decimal> = series
                .buckets()
                .iter()
                .map(|b| (b.week_start, b.total_quantity))
                .collect();

            prop_assert_eq!(series.len(), expected.len());
            prop_assert_eq!(actual, expected);
        }

        /// Input order does not change the series
        #[test]
        fn prop_aggregation_order_independent(sales in sales_strategy()) {
            let mut reversed = sales.clone();
            reversed.reverse();

            prop_assert_eq!(aggregate_weekly(&sales, today()), aggregate_weekly(&reversed, today()));
        }

        /// Reorder decisions agree with cumulative demand
        #[test]
        fn prop_reorder_consistent(stock in 0i64..600, forecast in forecast_strategy()) {
            let stock = Decimal::from(stock);
            let decision = evaluate_reorder(stock, &forecast);
            let total: u64 = forecast.iter().map(|p| p.predicted_quantity).sum();

            prop_assert_eq!(decision.total_forecasted, total);
            prop_assert_eq!(decision.needed, total > 0 && Decimal::from(total) >= stock);
            prop_assert_eq!(decision.quantity, (Decimal::from(total) - stock).max(Decimal::ZERO));
            prop_assert_eq!(decision.date.is_some(), decision.needed);

            if let Some(offset) = decision.week_offset {
                prop_assert!(offset < 5);
                // Cumulative demand before the reorder week stays below stock
                let before: u64 = forecast[..offset as usize]
                    .iter()
                    .map(|p| p.predicted_quantity)
                    .sum();
                prop_assert!(Decimal::from(before) < stock || offset == 0);
            }
        }

        /// Every report carries five forecast points and five past observations
        #[test]
        fn prop_report_shape(sales in sales_strategy(), stock in 0i64..500) {
            let report = build_product_report(
                &snapshot(1, stock, sales),
                today(),
                &RollingAverageBaseline,
            )
            .unwrap();

            prop_assert_eq!(report.forecast.len(), 5);
            prop_assert_eq!(report.past_sales.len(), 5);
            prop_assert!(report.forecast.iter().all(|p| (1..=52).contains(&report.week)
                && p.date >= today()));
        }
    }
}
