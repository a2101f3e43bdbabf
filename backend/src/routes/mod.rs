//! Route definitions for the Stockcast API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/inventory", inventory_routes())
        .nest("/products", product_routes())
        .nest("/forecast", forecast_routes())
}

/// Stock batch routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/batches",
            get(handlers::get_batch_inventory).post(handlers::add_stock),
        )
        .route("/dispatch", post(handlers::dispatch_stock))
        .route("/expiring-alerts", get(handlers::get_expiring_alerts))
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_product_summary))
        .route("/:product_id/batches", get(handlers::get_product_batches))
}

/// Demand forecast routes
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_forecast_summary))
        .route("/products/:product_id", get(handlers::get_product_forecast))
}
