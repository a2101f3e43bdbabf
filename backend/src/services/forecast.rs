//! Demand forecast service
//!
//! Loads each catalog product's stock and sales history from the store and
//! runs the shared forecasting pipeline over it.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::forecasting::{assemble_batch, build_product_report, DemandEstimator, ProductSnapshot};
use shared::{
    format_optional_date, ForecastBatch, ForecastError, ProductForecastReport, ProductId,
    SaleEvent,
};
use sqlx::{FromRow, PgPool};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::ForecastConfig;
use crate::error::{AppError, AppResult};

/// Forecast service building per-product demand and reorder reports
#[derive(Clone)]
pub struct ForecastService {
    db: PgPool,
    estimator: Arc<dyn DemandEstimator>,
    config: ForecastConfig,
}

/// Row for product info and current stock
#[derive(Debug, FromRow)]
struct ProductStockRow {
    product_name: String,
    unit: String,
    stock: Decimal,
}

/// Row for raw sales history
#[derive(Debug, FromRow)]
struct SaleRow {
    sales_date: NaiveDate,
    quantity: Option<String>,
}

/// Flat CSV row of a product report
#[derive(Debug, Serialize)]
pub struct ForecastCsvRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub week: u32,
    pub forecast: String,
    pub total_forecasted: u64,
    pub reorder_needed: bool,
    pub reorder_date: String,
    pub reorder_quantity: Decimal,
    pub coverage_percent: Decimal,
    pub stock_level: String,
    pub clamped_estimates: usize,
}

impl From<&ProductForecastReport> for ForecastCsvRow {
    fn from(r: &ProductForecastReport) -> Self {
        let forecast = r
            .forecast
            .iter()
            .map(|p| p.predicted_quantity.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        ForecastCsvRow {
            product_id: r.product_id,
            product_name: r.product_name.clone(),
            unit: r.unit.clone(),
            current_stock: r.current_stock,
            week: r.week,
            forecast,
            total_forecasted: r.reorder.total_forecasted,
            reorder_needed: r.reorder.needed,
            reorder_date: format_optional_date(r.reorder.date),
            reorder_quantity: r.reorder.quantity,
            coverage_percent: r.reorder.coverage_percent,
            stock_level: r.reorder.stock_level.to_string(),
            clamped_estimates: r.clamped_estimates,
        }
    }
}

/// Load the stored state of one product, `None` when it is not in the catalog
pub async fn load_snapshot(
    db: &PgPool,
    product_id: ProductId,
    today: NaiveDate,
) -> AppResult<Option<ProductSnapshot>> {
    let product = sqlx::query_as::<_, ProductStockRow>(
        r#"
        SELECT p.product_name, p.unit, COALESCE(SUM(i.quantity), 0) AS stock
        FROM products p
        LEFT JOIN inventory i ON p.product_id = i.product_id
        WHERE p.product_id = $1
        GROUP BY p.product_id, p.product_name, p.unit
        "#,
    )
    .bind(product_id)
    .fetch_optional(db)
    .await?;

    let Some(product) = product else {
        return Ok(None);
    };

    let sales = sqlx::query_as::<_, SaleRow>(
        r#"
        SELECT sales_date, quantity::text AS quantity
        FROM sales
        WHERE product_id = $1 AND sales_date <= $2
        "#,
    )
    .bind(product_id)
    .bind(today)
    .fetch_all(db)
    .await?
    .into_iter()
    .map(|row| SaleEvent::from_raw(product_id, row.sales_date, row.quantity.as_deref()))
    .collect();

    Ok(Some(ProductSnapshot {
        product_id,
        product_name: product.product_name,
        unit: product.unit,
        current_stock: product.stock,
        sales,
    }))
}

impl ForecastService {
    /// Create a new ForecastService instance
    pub fn new(db: PgPool, estimator: Arc<dyn DemandEstimator>, config: ForecastConfig) -> Self {
        Self {
            db,
            estimator,
            config,
        }
    }

    /// Product ids to forecast: the configured list, else every catalog product
    pub async fn catalog(&self) -> AppResult<Vec<ProductId>> {
        if let Some(ids) = &self.config.product_ids {
            return Ok(ids.clone());
        }

        let ids = sqlx::query_scalar::<_, i32>("SELECT product_id FROM products ORDER BY product_id")
            .fetch_all(&self.db)
            .await?;
        Ok(ids)
    }

    /// Build forecast reports for the whole catalog.
    ///
    /// Only an unreadable catalog fails the call; every per-product failure
    /// is reported inside the batch.
    pub async fn forecast_summary(&self, today: NaiveDate) -> AppResult<ForecastBatch> {
        let catalog = self.catalog().await?;
        let snapshots = self.load_snapshots(&catalog, today).await;

        let batch = assemble_batch(today, snapshots, self.estimator.as_ref());

        for report in batch.reports.iter().filter(|r| r.clamped_estimates > 0) {
            tracing::warn!(
                "Estimator {} produced {} negative or non-finite estimates for product {}",
                self.estimator.name(),
                report.clamped_estimates,
                report.product_id
            );
        }
        for failure in &batch.failures {
            tracing::warn!(
                "Forecast for product {} failed ({:?}): {}",
                failure.product_id,
                failure.kind,
                failure.message
            );
        }
        tracing::info!(
            "Forecast batch for {} built: {} reports, {} failures",
            today,
            batch.reports.len(),
            batch.failures.len()
        );

        Ok(batch)
    }

    /// Build the forecast report of a single product
    pub async fn forecast_product(
        &self,
        product_id: ProductId,
        today: NaiveDate,
    ) -> AppResult<ProductForecastReport> {
        let snapshot = load_snapshot(&self.db, product_id, today)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(build_product_report(&snapshot, today, self.estimator.as_ref())?)
    }

    /// Fetch snapshots concurrently, keeping catalog order
    async fn load_snapshots(
        &self,
        catalog: &[ProductId],
        today: NaiveDate,
    ) -> Vec<(ProductId, Result<Option<ProductSnapshot>, ForecastError>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism()));
        let mut tasks = JoinSet::new();

        for (position, &product_id) in catalog.iter().enumerate() {
            let db = self.db.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let snapshot = load_snapshot(&db, product_id, today)
                    .await
                    .map_err(ForecastError::from);
                (position, snapshot)
            });
        }

        let mut loaded: Vec<Option<Result<Option<ProductSnapshot>, ForecastError>>> =
            (0..catalog.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, snapshot)) => loaded[position] = Some(snapshot),
                Err(e) => tracing::error!("Snapshot task failed: {}", e),
            }
        }

        catalog
            .iter()
            .zip(loaded)
            .map(|(&product_id, snapshot)| {
                let snapshot = snapshot.unwrap_or_else(|| {
                    Err(ForecastError::DataAccess(
                        "Snapshot task did not complete".to_string(),
                    ))
                });
                (product_id, snapshot)
            })
            .collect()
    }

    /// Export a batch's reports as CSV
    pub fn export_to_csv(batch: &ForecastBatch) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for report in &batch.reports {
            wtr.serialize(ForecastCsvRow::from(report))
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
