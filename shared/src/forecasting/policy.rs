//! Reorder policy over a short demand forecast

use rust_decimal::Decimal;

use crate::models::{ForecastPoint, ReorderDecision, StockLevel};

/// Lowest coverage (percent) still rated `Moderate`
pub const MODERATE_COVERAGE_PERCENT: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

/// Classify stock health from coverage percent
pub fn classify_stock_level(coverage_percent: Decimal) -> StockLevel {
    if coverage_percent >= Decimal::ONE_HUNDRED {
        StockLevel::Sufficient
    } else if coverage_percent >= MODERATE_COVERAGE_PERCENT {
        StockLevel::Moderate
    } else {
        StockLevel::Critical
    }
}

/// Current stock as a percentage of forecasted demand; 100 when nothing is forecasted
pub fn coverage_percent(current_stock: Decimal, total_forecasted: u64) -> Decimal {
    if total_forecasted == 0 {
        return Decimal::ONE_HUNDRED;
    }
    current_stock / Decimal::from(total_forecasted) * Decimal::ONE_HUNDRED
}

/// Week offset at which to reorder: one week before cumulative demand
/// reaches `current_stock`, never below zero.
pub fn reorder_offset(current_stock: Decimal, demand: &[u64]) -> Option<u32> {
    if demand.iter().all(|&d| d == 0) {
        return None;
    }

    let mut cumulative = Decimal::ZERO;
    for (i, &quantity) in (0u32..).zip(demand) {
        cumulative += Decimal::from(quantity);
        if cumulative >= current_stock {
            return Some(i.saturating_sub(1));
        }
    }
    None
}

/// Turn current stock and forecast points into a reorder decision
pub fn evaluate_reorder(current_stock: Decimal, forecast: &[ForecastPoint]) -> ReorderDecision {
    let demand: Vec<u64> = forecast.iter().map(|p| p.predicted_quantity).collect();
    let total_forecasted = demand.iter().fold(0u64, |acc, &d| acc.saturating_add(d));

    let week_offset = reorder_offset(current_stock, &demand);
    let date = week_offset.and_then(|offset| {
        forecast
            .iter()
            .find(|p| p.week_offset == offset)
            .map(|p| p.date)
    });

    let quantity = (Decimal::from(total_forecasted) - current_stock).max(Decimal::ZERO);
    let coverage = coverage_percent(current_stock, total_forecasted);

    ReorderDecision {
        needed: week_offset.is_some(),
        week_offset,
        date,
        quantity,
        total_forecasted,
        coverage_percent: coverage.round_dp(2),
        stock_level: classify_stock_level(coverage),
    }
}
