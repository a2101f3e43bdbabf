//! HTTP handlers for demand forecast endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{ProductForecastReport, ProductId};

use crate::error::AppResult;
use crate::services::forecast::ForecastService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Evaluation date, defaults to the current UTC date
    pub as_of: Option<NaiveDate>,
    pub format: Option<String>, // "json" or "csv"
}

impl ForecastQuery {
    fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

fn forecast_service(state: &AppState) -> ForecastService {
    ForecastService::new(
        state.db.clone(),
        state.estimator.clone(),
        state.config.forecast.clone(),
    )
}

/// Forecast summary for every catalog product
pub async fn get_forecast_summary(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<impl IntoResponse> {
    let service = forecast_service(&state);
    let batch = service.forecast_summary(query.today()).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ForecastService::export_to_csv(&batch)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"forecast_summary.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(batch).into_response())
    }
}

/// Forecast report for a single product
pub async fn get_product_forecast(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ProductForecastReport>> {
    let service = forecast_service(&state);
    let report = service.forecast_product(product_id, query.today()).await?;
    Ok(Json(report))
}
