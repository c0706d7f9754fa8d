//! HTTP handlers for stock forecasting endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{Language, StockForecast};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::forecast::{ForecastSnapshotInput, ProductHistory};
use crate::services::ForecastService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub horizon_days: Option<u32>,
    pub language: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

fn forecast_service(state: &AppState) -> ForecastService {
    ForecastService::new(state.db.clone(), state.config.forecast.clone())
}

/// Get the reconstructed stock history of a product
pub async fn get_stock_history(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductHistory>> {
    let history = forecast_service(&state).product_history(product_id).await?;
    Ok(Json(history))
}

/// Get the stock forecast of a product
pub async fn get_product_forecast(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<impl IntoResponse> {
    let language = query
        .language
        .as_deref()
        .map(Language::from_code)
        .unwrap_or_default();

    let forecast = forecast_service(&state)
        .product_forecast(product_id, query.horizon_days, language)
        .await?;

    if query.format.as_deref() == Some("csv") {
        let rows = ForecastService::projection_rows(&forecast.forecast);
        let csv = ForecastService::export_to_csv(&rows)?;
        let disposition = format!("attachment; filename=\"forecast_{}.csv\"", product_id);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(forecast).into_response())
    }
}

/// Forecast a ledger snapshot supplied in the request body
pub async fn forecast_snapshot(
    State(state): State<AppState>,
    Json(input): Json<ForecastSnapshotInput>,
) -> AppResult<Json<StockForecast>> {
    let forecast = forecast_service(&state).forecast_snapshot(input)?;
    Ok(Json(forecast))
}
