//! HTTP handlers for stock batch and dispatch endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{BatchInventoryEntry, ExpiryAlert, InventoryBatch, ProductId, ProductStockSummary};

use crate::error::AppResult;
use crate::services::inventory::{AddStockInput, DispatchInput, DispatchReceipt, InventoryService};
use crate::AppState;

/// Add a stock batch
pub async fn add_stock(
    State(state): State<AppState>,
    Json(input): Json<AddStockInput>,
) -> AppResult<(StatusCode, Json<InventoryBatch>)> {
    let service = InventoryService::new(state.db);
    let batch = service.add_stock(input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// List a product's batches
pub async fn get_product_batches(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> AppResult<Json<Vec<InventoryBatch>>> {
    let service = InventoryService::new(state.db);
    let batches = service.get_batches(product_id).await?;
    Ok(Json(batches))
}

/// Dispatch batches to a customer
pub async fn dispatch_stock(
    State(state): State<AppState>,
    Json(input): Json<DispatchInput>,
) -> AppResult<Json<DispatchReceipt>> {
    let service = InventoryService::new(state.db);
    let receipt = service.dispatch_stock(input).await?;
    Ok(Json(receipt))
}

/// Stock totals per product
pub async fn get_product_summary(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductStockSummary>>> {
    let service = InventoryService::new(state.db);
    let summary = service.get_product_summary().await?;
    Ok(Json(summary))
}

/// Batches close to expiry
pub async fn get_expiring_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ExpiryAlert>>> {
    let service = InventoryService::new(state.db);
    let alerts = service
        .get_expiring_alerts(Utc::now().date_naive())
        .await?;
    Ok(Json(alerts))
}

/// Every batch with its days to expiry
pub async fn get_batch_inventory(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BatchInventoryEntry>>> {
    let service = InventoryService::new(state.db);
    let entries = service
        .get_batch_inventory(Utc::now().date_naive())
        .await?;
    Ok(Json(entries))
}
