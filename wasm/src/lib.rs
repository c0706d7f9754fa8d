//! WebAssembly module for the Stock Forecast UI
//!
//! Runs the forecasting pipeline client-side on a ledger snapshot the page has
//! already fetched:
//! - Stock history reconstruction
//! - Trend fitting and stockout projection
//! - Movement note decoding for debugging views

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::forecast::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Forecast a product's stock from a JSON array of movements
///
/// `today_iso` is a `YYYY-MM-DD` date; when omitted the browser clock is used.
/// Returns the serialized `StockForecast`.
#[wasm_bindgen]
pub fn forecast_stock(
    movements_json: &str,
    live_stock: f64,
    horizon_days: u32,
    today_iso: Option<String>,
) -> Result<String, JsValue> {
    let today = resolve_today(today_iso.as_deref())?;
    run_forecast(movements_json, live_stock, horizon_days, today)
        .map_err(|e| JsValue::from_str(&e))
}

/// Reconstruct the daily stock history from a JSON array of movements
#[wasm_bindgen]
pub fn reconstruct_stock_history(
    movements_json: &str,
    live_stock: f64,
    today_iso: Option<String>,
) -> Result<String, JsValue> {
    let today = resolve_today(today_iso.as_deref())?;
    run_reconstruction(movements_json, live_stock, today).map_err(|e| JsValue::from_str(&e))
}

/// Classify an average daily trend as growing, shrinking or stable
#[wasm_bindgen]
pub fn classify_trend(average_daily_trend: f64) -> String {
    format!("{}", TrendDirection::from_average(average_daily_trend))
}

/// Decode the replay semantics a ledger note carries
#[wasm_bindgen]
pub fn decode_movement_note(note: &str) -> String {
    MovementSemantics::decode(Some(note)).as_str().to_string()
}

fn resolve_today(today_iso: Option<&str>) -> Result<NaiveDate, JsValue> {
    match today_iso {
        Some(value) => parse_iso_date(value).map_err(|e| JsValue::from_str(&e.to_string())),
        None => {
            let now = String::from(js_sys::Date::new_0().to_iso_string());
            parse_iso_date(now.get(..10).unwrap_or_default())
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }
    }
}

fn parse_snapshot(
    movements_json: &str,
    live_stock: f64,
    today: NaiveDate,
) -> Result<(Vec<MovementRecord>, Decimal), String> {
    let movements: Vec<MovementRecord> = serde_json::from_str(movements_json)
        .map_err(|e| format!("Invalid movements JSON: {}", e))?;
    validate_ledger_snapshot(&movements)?;
    validate_history_span(&movements, Some(today))?;

    let live_stock = Decimal::try_from(live_stock)
        .map_err(|_| "Live stock must be a finite number".to_string())?;
    validate_live_stock(live_stock)?;

    Ok((movements, live_stock))
}

fn run_forecast(
    movements_json: &str,
    live_stock: f64,
    horizon_days: u32,
    today: NaiveDate,
) -> Result<String, String> {
    let (movements, live_stock) = parse_snapshot(movements_json, live_stock, today)?;
    let horizon = ForecastHorizon::new(horizon_days).map_err(|e| e.to_string())?;

    let options = ForecastOptions::new(today, horizon);
    let forecast = shared::forecast_stock(&movements, live_stock, &options);
    serde_json::to_string(&forecast).map_err(|e| e.to_string())
}

fn run_reconstruction(
    movements_json: &str,
    live_stock: f64,
    today: NaiveDate,
) -> Result<String, String> {
    let (movements, live_stock) = parse_snapshot(movements_json, live_stock, today)?;

    let options = ReconstructionOptions::new(today);
    let history = reconstruct_history(&movements, live_stock, &options);
    serde_json::to_string(&history).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = r#"[
        {"movement_type": "ADD", "quantity": 40, "created_at": "2024-03-01T09:00:00Z",
         "note": "Creation"},
        {"movement_type": "SALE", "quantity": 4, "created_at": "2024-03-02T09:00:00Z"},
        {"movement_type": "SALE", "quantity": 4, "created_at": "2024-03-03T09:00:00Z"},
        {"movement_type": "SALE", "quantity": 4, "created_at": "2024-03-04T09:00:00Z"}
    ]"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_classify_trend() {
        assert_eq!(classify_trend(1.5), "growing");
        assert_eq!(classify_trend(-0.2), "shrinking");
        assert_eq!(classify_trend(0.0), "stable");
    }

    #[test]
    fn test_decode_movement_note() {
        assert_eq!(decode_movement_note("Création du produit"), "explicit_creation");
        assert_eq!(decode_movement_note("Ajustement 12 → 7"), "explicit_override");
        assert_eq!(decode_movement_note("Ajustement 12 → ?"), "standard_delta");
        assert_eq!(decode_movement_note("Vente comptoir"), "standard_delta");
    }

    #[test]
    fn test_run_forecast() {
        let json = run_forecast(LEDGER, 28.0, 14, today()).unwrap();
        let forecast: StockForecast = serde_json::from_str(&json).unwrap();

        assert_eq!(forecast.history.points.len(), 4);
        assert!(forecast.report.has_enough_data);
        assert_eq!(forecast.report.trend, TrendDirection::Shrinking);
        // 40 - 4x reaches zero on day 10
        assert_eq!(forecast.prediction.days_until_stockout, Some(10));
        assert_eq!(forecast.stockout_date, NaiveDate::from_ymd_opt(2024, 3, 11));
    }

    #[test]
    fn test_run_reconstruction() {
        let json = run_reconstruction(LEDGER, 28.0, today()).unwrap();
        let history: StockHistory = serde_json::from_str(&json).unwrap();

        let levels: Vec<f64> = history.points.iter().map(|p| p.stock_level).collect();
        assert_eq!(levels, vec![40.0, 36.0, 32.0, 28.0]);
        assert!(!history.was_corrected());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(run_forecast("not json", 0.0, 30, today()).is_err());
        assert!(run_forecast(LEDGER, -1.0, 30, today()).is_err());
        assert!(run_forecast(LEDGER, 28.0, 0, today()).is_err());
    }

    #[test]
    fn test_rejects_unbounded_history() {
        let spread = r#"[
            {"movement_type": "ADD", "quantity": 100, "created_at": "0001-01-01T00:00:00Z",
             "note": "Creation"},
            {"movement_type": "SALE", "quantity": 1, "created_at": "1000-01-01T00:00:00Z"},
            {"movement_type": "SALE", "quantity": 1, "created_at": "9999-01-01T00:00:00Z"}
        ]"#;
        assert!(run_forecast(spread, 98.0, 30, today()).is_err());

        let far_today = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();
        assert!(run_forecast(LEDGER, 28.0, 30, far_today).is_err());
        assert!(run_reconstruction(LEDGER, 28.0, far_today).is_err());
    }
}
