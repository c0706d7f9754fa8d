//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ledger: String,
    pub max_horizon_days: u32,
}

/// Report service health and whether the movement ledger is reachable
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ledger = match sqlx::query("SELECT 1 FROM stock_movements LIMIT 1")
        .execute(&state.db)
        .await
    {
        Ok(_) => "reachable",
        Err(err) => {
            tracing::warn!("Ledger health probe failed: {}", err);
            "unreachable"
        }
    };

    Json(HealthResponse {
        status: if ledger == "reachable" { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger: ledger.to_string(),
        max_horizon_days: state.config.forecast.max_horizon_days,
    })
}
