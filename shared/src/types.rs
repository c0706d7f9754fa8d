//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

/// Horizon offered by the UI when the caller does not pick one
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Upper bound on a forecast horizon (ten years)
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// Upper bound on the days between the first movement and the last history point
///
/// The projection starts at the first movement, so this together with
/// [`MAX_HORIZON_DAYS`] bounds the size of a projected series.
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    /// Resolve a language from its ISO 639-1 code, falling back to English
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "fr" | "french" => Language::French,
            _ => Language::English,
        }
    }
}

/// Number of days to project beyond the last observed data point
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub struct ForecastHorizon(u32);

impl ForecastHorizon {
    /// Create a horizon, rejecting zero and anything above [`MAX_HORIZON_DAYS`]
    pub fn new(days: u32) -> ForecastResult<Self> {
        if days == 0 || days > MAX_HORIZON_DAYS {
            return Err(ForecastError::InvalidHorizon {
                days,
                max: MAX_HORIZON_DAYS,
            });
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }
}

impl Default for ForecastHorizon {
    fn default() -> Self {
        Self(DEFAULT_HORIZON_DAYS)
    }
}

impl TryFrom<u32> for ForecastHorizon {
    type Error = ForecastError;

    fn try_from(days: u32) -> ForecastResult<Self> {
        Self::new(days)
    }
}

impl From<ForecastHorizon> for u32 {
    fn from(horizon: ForecastHorizon) -> Self {
        horizon.0
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_iso_date(value: &str) -> ForecastResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ForecastError::InvalidDate(value.to_string()))
}
