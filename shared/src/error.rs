//! Domain errors for the forecasting pipeline

use thiserror::Error;

/// Errors raised while decoding forecast inputs
///
/// The pipeline itself never fails: insufficient data, malformed override
/// notes and live-stock mismatches all resolve to defined results. These
/// errors only guard the boundary where raw input becomes typed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Forecast horizon must be between 1 and {max} days, got {days}")]
    InvalidHorizon { days: u32, max: u32 },

    #[error("Unknown movement type: {0}")]
    UnknownMovementType(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result type alias for forecast input decoding
pub type ForecastResult<T> = Result<T, ForecastError>;
