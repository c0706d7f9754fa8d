//! Trend fitting: quadratic projection of a stock history

use crate::models::{PredictionResult, ProjectedPoint, StockPoint};
use crate::types::ForecastHorizon;

use super::regression::{self, TERMS};

/// Projected levels this close to zero count as a stockout
///
/// Absorbs floating-point noise from the solver so that a curve passing
/// through zero on an integer day reports that day.
const ZERO_SNAP: f64 = 1e-9;

/// Clamp a projected level to the non-negative range
fn clamp_stock(level: f64) -> f64 {
    if level.is_nan() || level <= ZERO_SNAP {
        0.0
    } else {
        level
    }
}

/// Fit a degree-2 trend to `points` and project it `horizon` days forward
///
/// Fewer than three points (or a singular system) yields
/// [`PredictionResult::degenerate`]; the caller renders that as
/// "not enough data".
pub fn fit_trend(points: &[StockPoint], horizon: ForecastHorizon) -> PredictionResult {
    if points.len() < TERMS {
        return PredictionResult::degenerate(horizon);
    }

    let xs: Vec<f64> = points.iter().map(|p| f64::from(p.days_since_epoch)).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.stock_level).collect();

    let Some(coefficients) = regression::fit_quadratic(&xs, &ys) else {
        tracing::debug!(
            points = points.len(),
            "Stock history is not solvable, skipping projection"
        );
        return PredictionResult::degenerate(horizon);
    };

    let Some(last) = points.iter().max_by_key(|p| p.days_since_epoch) else {
        return PredictionResult::degenerate(horizon);
    };
    let end_day = last.days_since_epoch.saturating_add(horizon.days());

    let projected_series: Vec<ProjectedPoint> = (0..=end_day)
        .map(|day| ProjectedPoint {
            day,
            stock_level: clamp_stock(coefficients.evaluate(f64::from(day))),
        })
        .collect();

    let horizon_value = projected_series.last().map_or(0.0, |p| p.stock_level);
    let days_until_stockout = projected_series
        .iter()
        .find(|p| p.stock_level == 0.0)
        .map(|p| p.day);

    let average_daily_trend = (horizon_value - last.stock_level) / f64::from(horizon.days());

    PredictionResult {
        coefficients,
        r_squared: regression::r_squared(&coefficients, &xs, &ys),
        projected_series,
        horizon_value,
        days_until_stockout,
        average_daily_trend: if average_daily_trend.is_finite() {
            average_daily_trend
        } else {
            0.0
        },
        horizon_days: horizon.days(),
    }
}
