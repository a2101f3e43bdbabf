//! Inventory management service for stock batches, dispatches and expiry alerts

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    classify_expiry, days_until, validate_batch_dates, validate_batch_selection,
    validate_product_id, validate_quantity, BatchInventoryEntry, ExpiryAlert, InventoryBatch,
    ProductId, ProductStockSummary, EXPIRY_ALERT_WINDOW_DAYS,
};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

/// Inventory service for managing stock batches
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for adding a stock batch
#[derive(Debug, Deserialize)]
pub struct AddStockInput {
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Input for dispatching batches to a customer
#[derive(Debug, Deserialize)]
pub struct DispatchInput {
    pub batch_ids: Vec<i32>,
    pub delivered_on: NaiveDate,
    pub quantity_removed: Decimal,
}

/// Result of a dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub product_id: ProductId,
    pub batches_removed: u64,
    pub quantity_removed: Decimal,
    pub delivered_on: NaiveDate,
}

/// Row for batch queries
#[derive(Debug, FromRow)]
struct BatchRow {
    batch_id: i32,
    product_id: i32,
    quantity: Decimal,
    production_date: NaiveDate,
    expiry_date: NaiveDate,
}

impl From<BatchRow> for InventoryBatch {
    fn from(r: BatchRow) -> Self {
        InventoryBatch {
            batch_id: r.batch_id,
            product_id: r.product_id,
            quantity: r.quantity,
            production_date: r.production_date,
            expiry_date: r.expiry_date,
        }
    }
}

/// Row for batch listings joined with product names
#[derive(Debug, FromRow)]
struct NamedBatchRow {
    batch_id: i32,
    product_name: String,
    quantity: Decimal,
    production_date: NaiveDate,
    expiry_date: NaiveDate,
}

/// Row for product summary query
#[derive(Debug, FromRow)]
struct SummaryRow {
    product_id: i32,
    product_name: String,
    unit: String,
    total_quantity: Decimal,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a stock batch for a product
    pub async fn add_stock(&self, input: AddStockInput) -> AppResult<InventoryBatch> {
        validate_product_id(input.product_id)
            .map_err(|msg| AppError::validation("product_id", msg))?;
        validate_quantity(input.quantity).map_err(|msg| AppError::validation("quantity", msg))?;
        validate_batch_dates(input.production_date, input.expiry_date)
            .map_err(|msg| AppError::validation("expiry_date", msg))?;

        let product_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE product_id = $1)",
        )
        .bind(input.product_id)
        .fetch_one(&self.db)
        .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let row = sqlx::query_as::<_, BatchRow>(
            r#"
            INSERT INTO inventory (product_id, production_date, expiry_date, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING batch_id, product_id, quantity, production_date, expiry_date
            "#,
        )
        .bind(input.product_id)
        .bind(input.production_date)
        .bind(input.expiry_date)
        .bind(input.quantity)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Added batch {} of product {} ({} units)",
            row.batch_id,
            row.product_id,
            row.quantity
        );

        Ok(row.into())
    }

    /// Get a product's batches, soonest expiry first
    pub async fn get_batches(&self, product_id: ProductId) -> AppResult<Vec<InventoryBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT batch_id, product_id, quantity, production_date, expiry_date
            FROM inventory
            WHERE product_id = $1
            ORDER BY expiry_date ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Remove dispatched batches and record the sale
    pub async fn dispatch_stock(&self, input: DispatchInput) -> AppResult<DispatchReceipt> {
        validate_batch_selection(&input.batch_ids)
            .map_err(|msg| AppError::validation("batch_ids", msg))?;
        validate_quantity(input.quantity_removed)
            .map_err(|msg| AppError::validation("quantity_removed", msg))?;

        // Start transaction
        let mut tx = self.db.begin().await?;

        // All selected batches are taken to belong to the first batch's product
        let product_id = sqlx::query_scalar::<_, i32>(
            "SELECT product_id FROM inventory WHERE batch_id = $1",
        )
        .bind(input.batch_ids[0])
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        let removed = sqlx::query("DELETE FROM inventory WHERE batch_id = ANY($1)")
            .bind(&input.batch_ids)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO sales (product_id, quantity, sales_date) VALUES ($1, $2, $3)")
            .bind(product_id)
            .bind(input.quantity_removed)
            .bind(input.delivered_on)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Dispatched {} batches of product {}, sale of {} recorded",
            removed.rows_affected(),
            product_id,
            input.quantity_removed
        );

        Ok(DispatchReceipt {
            product_id,
            batches_removed: removed.rows_affected(),
            quantity_removed: input.quantity_removed,
            delivered_on: input.delivered_on,
        })
    }

    /// Get every product with its total stock
    pub async fn get_product_summary(&self) -> AppResult<Vec<ProductStockSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT p.product_id, p.product_name, p.unit,
                   COALESCE(SUM(i.quantity), 0) AS total_quantity
            FROM products p
            LEFT JOIN inventory i ON p.product_id = i.product_id
            GROUP BY p.product_id, p.product_name, p.unit
            ORDER BY p.product_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductStockSummary {
                product_id: r.product_id,
                product_name: r.product_name,
                unit: r.unit,
                total_quantity: r.total_quantity,
            })
            .collect())
    }

    /// Get batches expiring within the alert window
    pub async fn get_expiring_alerts(&self, today: NaiveDate) -> AppResult<Vec<ExpiryAlert>> {
        let rows = sqlx::query_as::<_, NamedBatchRow>(
            r#"
            SELECT i.batch_id, p.product_name, i.quantity, i.production_date, i.expiry_date
            FROM inventory i
            JOIN products p ON i.product_id = p.product_id
            WHERE i.expiry_date - $1::date <= $2
            ORDER BY i.expiry_date ASC
            "#,
        )
        .bind(today)
        .bind(EXPIRY_ALERT_WINDOW_DAYS as i32)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let days_remaining = days_until(r.expiry_date, today);
                ExpiryAlert {
                    product_name: r.product_name,
                    batch_id: r.batch_id,
                    expiry_date: r.expiry_date,
                    days_remaining,
                    severity: classify_expiry(days_remaining),
                }
            })
            .collect())
    }

    /// Get every batch with its product name and days to expiry
    pub async fn get_batch_inventory(&self, today: NaiveDate) -> AppResult<Vec<BatchInventoryEntry>> {
        let rows = sqlx::query_as::<_, NamedBatchRow>(
            r#"
            SELECT i.batch_id, p.product_name, i.quantity, i.production_date, i.expiry_date
            FROM inventory i
            JOIN products p ON i.product_id = p.product_id
            ORDER BY i.expiry_date ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BatchInventoryEntry {
                product_name: r.product_name,
                batch_id: r.batch_id,
                quantity: r.quantity,
                production_date: r.production_date,
                expiration_date: r.expiry_date,
                days_to_expire: days_until(r.expiry_date, today),
            })
            .collect())
    }
}
