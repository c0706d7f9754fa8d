//! Route definitions for the Stock Forecast service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Forecast of a caller-supplied ledger snapshot
        .route("/forecast", post(handlers::forecast_snapshot))
        // Product stock history and forecast
        .nest("/products", product_routes())
}

/// Product forecasting routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/:product_id/history", get(handlers::get_stock_history))
        .route("/:product_id/forecast", get(handlers::get_product_forecast))
}
