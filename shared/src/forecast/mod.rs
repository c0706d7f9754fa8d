//! Stock forecasting pipeline
//!
//! Ledger snapshot → [`reconstruct_history`] → [`fit_trend`] →
//! [`PredictionReport`]. Every stage is a pure function of its inputs; the
//! caller owns any caching and simply recomputes when inputs change.

pub mod reconstruct;
pub mod regression;
pub mod report;
pub mod trend;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{MovementRecord, PredictionResult, StockHistory};
use crate::types::{ForecastHorizon, Language};

pub use reconstruct::{reconstruct_history, ReconstructionOptions, DEFAULT_STOCK_TOLERANCE};
pub use report::{PredictionReport, TrendDirection};
pub use trend::fit_trend;

/// Parameters of a full forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOptions {
    pub reconstruction: ReconstructionOptions,
    pub horizon: ForecastHorizon,
    pub language: Language,
}

impl ForecastOptions {
    pub fn new(today: NaiveDate, horizon: ForecastHorizon) -> Self {
        Self {
            reconstruction: ReconstructionOptions::new(today),
            horizon,
            language: Language::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.reconstruction = self.reconstruction.with_tolerance(tolerance);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// Everything the UI needs to chart and describe a product forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockForecast {
    pub history: StockHistory,
    pub prediction: PredictionResult,
    pub report: PredictionReport,
    /// Calendar date of `prediction.days_until_stockout`
    pub stockout_date: Option<NaiveDate>,
}

impl StockForecast {
    /// Calendar date of a projected day offset
    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        self.history
            .origin()
            .map(|origin| origin + Duration::days(i64::from(day)))
    }
}

/// Run the whole pipeline on one product's ledger snapshot
pub fn forecast_stock(
    movements: &[MovementRecord],
    live_stock: Decimal,
    options: &ForecastOptions,
) -> StockForecast {
    let history = reconstruct_history(movements, live_stock, &options.reconstruction);
    let prediction = fit_trend(&history.points, options.horizon);
    let report = PredictionReport::from_result(&prediction, options.language);

    let mut forecast = StockForecast {
        history,
        prediction,
        report,
        stockout_date: None,
    };
    forecast.stockout_date = forecast
        .prediction
        .days_until_stockout
        .and_then(|day| forecast.date_of(day));
    forecast
}
