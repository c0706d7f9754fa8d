//! Presentation fields derived from a prediction

use serde::{Deserialize, Serialize};

use crate::models::PredictionResult;
use crate::types::Language;

/// Qualitative direction of the projected stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Growing,
    Shrinking,
    Stable,
}

impl TrendDirection {
    /// Classify an average daily trend by its sign
    pub fn from_average(average_daily_trend: f64) -> Self {
        if average_daily_trend > 0.0 {
            TrendDirection::Growing
        } else if average_daily_trend < 0.0 {
            TrendDirection::Shrinking
        } else {
            TrendDirection::Stable
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (TrendDirection::Growing, Language::English) => "growing",
            (TrendDirection::Shrinking, Language::English) => "shrinking",
            (TrendDirection::Stable, Language::English) => "stable",
            (TrendDirection::Growing, Language::French) => "en hausse",
            (TrendDirection::Shrinking, Language::French) => "en baisse",
            (TrendDirection::Stable, Language::French) => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label(Language::English))
    }
}

/// Human-facing summary of a [`PredictionResult`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionReport {
    pub has_enough_data: bool,
    pub trend: TrendDirection,
    pub trend_label: String,
    pub average_daily_trend: f64,
    /// `r_squared × 100`, one decimal
    pub precision_percent: f64,
    pub horizon_days: u32,
    pub horizon_value: f64,
    pub days_until_stockout: Option<u32>,
    pub stockout_message: String,
}

impl PredictionReport {
    pub fn from_result(result: &PredictionResult, language: Language) -> Self {
        let trend = TrendDirection::from_average(result.average_daily_trend);
        Self {
            has_enough_data: result.has_projection(),
            trend,
            trend_label: trend.label(language).to_string(),
            average_daily_trend: result.average_daily_trend,
            precision_percent: precision_percent(result.r_squared),
            horizon_days: result.horizon_days,
            horizon_value: result.horizon_value,
            days_until_stockout: result.days_until_stockout,
            stockout_message: stockout_message(result.days_until_stockout, language),
        }
    }
}

/// R² as a percentage rounded to one decimal
pub fn precision_percent(r_squared: f64) -> f64 {
    if !r_squared.is_finite() {
        return 0.0;
    }
    (r_squared * 1000.0).round() / 10.0
}

pub fn stockout_message(days_until_stockout: Option<u32>, language: Language) -> String {
    match (days_until_stockout, language) {
        (None, Language::English) => "no stockout projected".to_string(),
        (None, Language::French) => "aucune rupture prévue".to_string(),
        (Some(days), Language::English) => format!("stockout in {} days", days),
        (Some(days), Language::French) => format!("rupture dans {} jours", days),
    }
}
