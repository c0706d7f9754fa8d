//! Forecast service for projecting product stock from the movement ledger

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    forecast_stock, reconstruct_history, validate_history_span, validate_horizon_days,
    validate_ledger_snapshot, validate_live_stock, ForecastHorizon, ForecastOptions, Language,
    MovementRecord, ProductStock, ReconstructionOptions, StockForecast, StockHistory,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::ForecastConfig;
use crate::error::{AppError, AppResult};
use crate::services::ledger::LedgerService;

/// Forecast service wrapping the ledger reader and forecast settings
#[derive(Clone)]
pub struct ForecastService {
    ledger: LedgerService,
    settings: ForecastConfig,
}

/// Input for forecasting a caller-supplied ledger snapshot
#[derive(Debug, Deserialize, Validate)]
pub struct ForecastSnapshotInput {
    pub movements: Vec<MovementRecord>,
    pub live_stock: Decimal,
    #[validate(range(min = 1, max = 3650))]
    pub horizon_days: Option<u32>,
    /// Defaults to the current UTC date
    pub today: Option<NaiveDate>,
    pub language: Option<String>,
}

/// Reconstructed history for a stored product
#[derive(Debug, Clone, Serialize)]
pub struct ProductHistory {
    pub product: ProductStock,
    #[serde(flatten)]
    pub history: StockHistory,
}

/// Forecast for a stored product
#[derive(Debug, Clone, Serialize)]
pub struct ProductForecast {
    pub product: ProductStock,
    #[serde(flatten)]
    pub forecast: StockForecast,
    /// First projected day at or below the product's alert threshold
    pub days_until_alert: Option<u32>,
}

/// One line of the projection export
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionRow {
    pub day: u32,
    pub date: Option<NaiveDate>,
    pub observed_stock: Option<f64>,
    pub projected_stock: f64,
}

impl ForecastService {
    /// Create a new ForecastService instance
    pub fn new(db: PgPool, settings: ForecastConfig) -> Self {
        Self {
            ledger: LedgerService::new(db),
            settings,
        }
    }

    /// Resolve a requested horizon against the configured default and maximum
    pub fn resolve_horizon(&self, requested: Option<u32>) -> AppResult<ForecastHorizon> {
        let days = requested.unwrap_or(self.settings.default_horizon_days);
        validate_horizon_days(days, self.settings.max_horizon_days)
            .map_err(|msg| AppError::validation("horizon_days", msg))?;
        Ok(ForecastHorizon::new(days)?)
    }

    fn options(
        &self,
        today: NaiveDate,
        horizon: ForecastHorizon,
        language: Language,
    ) -> ForecastOptions {
        ForecastOptions::new(today, horizon)
            .with_tolerance(self.settings.stock_tolerance)
            .with_language(language)
    }

    /// Get the reconstructed stock history of a product
    pub async fn product_history(&self, product_id: Uuid) -> AppResult<ProductHistory> {
        let product = self.ledger.fetch_product_stock(product_id).await?;
        let movements = self.ledger.fetch_movements(product_id).await?;

        let options = ReconstructionOptions::new(Utc::now().date_naive())
            .with_tolerance(self.settings.stock_tolerance);
        let history = reconstruct_history(&movements, product.quantity, &options);

        Ok(ProductHistory { product, history })
    }

    /// Forecast the stock of a product
    pub async fn product_forecast(
        &self,
        product_id: Uuid,
        horizon_days: Option<u32>,
        language: Language,
    ) -> AppResult<ProductForecast> {
        let horizon = self.resolve_horizon(horizon_days)?;
        let product = self.ledger.fetch_product_stock(product_id).await?;
        let movements = self.ledger.fetch_movements(product_id).await?;

        let today = Utc::now().date_naive();
        validate_history_span(&movements, Some(today))
            .map_err(|msg| AppError::validation("movements", msg))?;

        let options = self.options(today, horizon, language);
        let forecast = forecast_stock(&movements, product.quantity, &options);

        if let Some(correction) = &forecast.history.correction {
            tracing::warn!(
                %product_id,
                computed = %correction.computed,
                live = %correction.live,
                "Ledger replay disagrees with live stock"
            );
        }

        let days_until_alert = product
            .alert_threshold
            .and_then(|threshold| threshold.to_f64())
            .and_then(|threshold| forecast.prediction.days_until_below(threshold));

        Ok(ProductForecast {
            product,
            forecast,
            days_until_alert,
        })
    }

    /// Forecast a ledger snapshot supplied by the caller
    pub fn forecast_snapshot(&self, input: ForecastSnapshotInput) -> AppResult<StockForecast> {
        input.validate()?;
        validate_live_stock(input.live_stock)
            .map_err(|msg| AppError::validation("live_stock", msg))?;
        validate_ledger_snapshot(&input.movements)
            .map_err(|msg| AppError::validation("movements", msg))?;

        let horizon = self.resolve_horizon(input.horizon_days)?;
        let today = input.today.unwrap_or_else(|| Utc::now().date_naive());
        validate_history_span(&input.movements, Some(today))
            .map_err(|msg| AppError::validation("today", msg))?;
        let language = input
            .language
            .as_deref()
            .map(Language::from_code)
            .unwrap_or_default();

        let options = self.options(today, horizon, language);
        Ok(forecast_stock(&input.movements, input.live_stock, &options))
    }

    /// Flatten a forecast into export rows, one per projected day
    pub fn projection_rows(forecast: &StockForecast) -> Vec<ProjectionRow> {
        let observed: HashMap<u32, f64> = forecast
            .history
            .points
            .iter()
            .map(|p| (p.days_since_epoch, p.stock_level))
            .collect();

        forecast
            .prediction
            .projected_series
            .iter()
            .map(|point| ProjectionRow {
                day: point.day,
                date: forecast.date_of(point.day),
                observed_stock: observed.get(&point.day).copied(),
                projected_stock: point.stock_level,
            })
            .collect()
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
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
