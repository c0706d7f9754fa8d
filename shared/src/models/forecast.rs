//! Stock history and prediction models

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ForecastHorizon;

/// Reconstructed stock level at the end of one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockPoint {
    pub date: NaiveDate,
    /// Offset in days from the first observed date (regression x)
    pub days_since_epoch: u32,
    /// Never negative (regression y)
    pub stock_level: f64,
}

impl StockPoint {
    /// Build a point for `date`, clamping the level at zero
    pub fn new(date: NaiveDate, origin: NaiveDate, level: Decimal) -> Self {
        let offset = (date - origin).num_days().max(0);
        Self {
            date,
            days_since_epoch: u32::try_from(offset).unwrap_or(u32::MAX),
            stock_level: level.max(Decimal::ZERO).to_f64().unwrap_or(0.0),
        }
    }
}

/// Diagnostic emitted when the replayed ledger disagrees with the live stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockCorrection {
    /// Running value the ledger replay ended on
    pub computed: Decimal,
    /// Live stock the final points were forced to
    pub live: Decimal,
}

impl StockCorrection {
    pub fn discrepancy(&self) -> Decimal {
        self.live - self.computed
    }
}

/// Output of the stock reconstructor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StockHistory {
    /// Ordered by date, one point per day with movements (plus today)
    pub points: Vec<StockPoint>,
    pub correction: Option<StockCorrection>,
}

impl StockHistory {
    /// First observed date, the x origin of the series
    pub fn origin(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn was_corrected(&self) -> bool {
        self.correction.is_some()
    }
}

/// Coefficients of `y = intercept + linear·x + quadratic·x²`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PolynomialCoefficients {
    pub intercept: f64,
    pub linear: f64,
    pub quadratic: f64,
}

impl PolynomialCoefficients {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.intercept + self.linear * x + self.quadratic * x * x
    }

    pub fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.linear.is_finite() && self.quadratic.is_finite()
    }
}

/// One day of the fitted curve, clamped at zero
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectedPoint {
    pub day: u32,
    pub stock_level: f64,
}

/// Fitted trend and projection for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub coefficients: PolynomialCoefficients,
    /// Coefficient of determination in [0, 1]
    pub r_squared: f64,
    /// Contiguous days from 0 through the last observed day plus the horizon
    pub projected_series: Vec<ProjectedPoint>,
    /// Projected stock at the end of the horizon
    pub horizon_value: f64,
    /// First projected day whose stock is exactly zero
    pub days_until_stockout: Option<u32>,
    /// `(horizon_value - last observed stock) / horizon_days`
    pub average_daily_trend: f64,
    pub horizon_days: u32,
}

impl PredictionResult {
    /// Result returned when there is not enough history to fit a curve
    pub fn degenerate(horizon: ForecastHorizon) -> Self {
        Self {
            coefficients: PolynomialCoefficients::default(),
            r_squared: 0.0,
            projected_series: Vec::new(),
            horizon_value: 0.0,
            days_until_stockout: None,
            average_daily_trend: 0.0,
            horizon_days: horizon.days(),
        }
    }

    /// Whether a curve was fitted (false means "not enough data")
    pub fn has_projection(&self) -> bool {
        !self.projected_series.is_empty()
    }

    pub fn value_at(&self, day: u32) -> Option<f64> {
        self.projected_series
            .iter()
            .find(|p| p.day == day)
            .map(|p| p.stock_level)
    }

    /// First projected day whose stock is at or below `threshold`
    pub fn days_until_below(&self, threshold: f64) -> Option<u32> {
        self.projected_series
            .iter()
            .find(|p| p.stock_level <= threshold)
            .map(|p| p.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_stock_point_offsets_and_clamps() {
        let point = StockPoint::new(day(5), day(1), Decimal::from(-3));
        assert_eq!(point.days_since_epoch, 4);
        assert_eq!(point.stock_level, 0.0);

        let point = StockPoint::new(day(1), day(1), Decimal::from_str("12.5").unwrap());
        assert_eq!(point.days_since_epoch, 0);
        assert_eq!(point.stock_level, 12.5);
    }

    #[test]
    fn test_polynomial_evaluation() {
        let c = PolynomialCoefficients {
            intercept: 1.0,
            linear: 2.0,
            quadratic: 3.0,
        };
        assert_eq!(c.evaluate(0.0), 1.0);
        assert_eq!(c.evaluate(2.0), 17.0);
        assert!(c.is_finite());
        assert!(!PolynomialCoefficients {
            intercept: f64::NAN,
            ..c
        }
        .is_finite());
    }

    #[test]
    fn test_degenerate_result() {
        let result = PredictionResult::degenerate(ForecastHorizon::default());
        assert!(!result.has_projection());
        assert_eq!(result.horizon_days, 30);
        assert_eq!(result.days_until_below(10.0), None);
    }

    #[test]
    fn test_days_until_below() {
        let result = PredictionResult {
            projected_series: vec![
                ProjectedPoint { day: 0, stock_level: 30.0 },
                ProjectedPoint { day: 1, stock_level: 20.0 },
                ProjectedPoint { day: 2, stock_level: 10.0 },
            ],
            ..PredictionResult::degenerate(ForecastHorizon::default())
        };
        assert_eq!(result.days_until_below(20.0), Some(1));
        assert_eq!(result.days_until_below(5.0), None);
        assert_eq!(result.value_at(2), Some(10.0));
    }

    #[test]
    fn test_correction_discrepancy() {
        let correction = StockCorrection {
            computed: Decimal::from(85),
            live: Decimal::from(80),
        };
        assert_eq!(correction.discrepancy(), Decimal::from(-5));
    }
}
