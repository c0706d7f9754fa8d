//! Validation utilities for forecast inputs
//!
//! Used by the HTTP and WASM boundaries before a caller-supplied ledger
//! snapshot reaches the pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::MovementRecord;
use crate::types::{MAX_HISTORY_DAYS, MAX_HORIZON_DAYS};

/// Validate a movement quantity is a non-negative magnitude
pub fn validate_movement_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Movement quantity cannot be negative");
    }
    Ok(())
}

/// Validate the live stock reported by the product store
pub fn validate_live_stock(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Live stock cannot be negative");
    }
    Ok(())
}

/// Validate a horizon against a configured maximum
pub fn validate_horizon_days(days: u32, max_days: u32) -> Result<(), &'static str> {
    if days == 0 {
        return Err("Forecast horizon must be at least one day");
    }
    if days > max_days.min(MAX_HORIZON_DAYS) {
        return Err("Forecast horizon exceeds the allowed maximum");
    }
    Ok(())
}

/// Validate the history a snapshot replays into stays within [`MAX_HISTORY_DAYS`]
///
/// `today` extends the history when it falls after the last movement.
pub fn validate_history_span(
    movements: &[MovementRecord],
    today: Option<NaiveDate>,
) -> Result<(), &'static str> {
    let Some(first) = movements.iter().map(MovementRecord::date).min() else {
        return Ok(());
    };
    let last = movements
        .iter()
        .map(MovementRecord::date)
        .chain(today)
        .max()
        .unwrap_or(first);

    if (last - first).num_days() > i64::from(MAX_HISTORY_DAYS) {
        return Err("Ledger history spans more days than can be forecast");
    }
    Ok(())
}

/// Validate a ledger snapshot belongs to a single product
///
/// Records whose product was deleted carry no product id and are accepted.
pub fn validate_ledger_snapshot(movements: &[MovementRecord]) -> Result<(), &'static str> {
    let mut product = None;
    for movement in movements {
        validate_movement_quantity(movement.quantity)?;
        match (product, movement.product_id) {
            (_, None) => {}
            (None, Some(id)) => product = Some(id),
            (Some(expected), Some(id)) if expected != id => {
                return Err("Ledger snapshot mixes movements of several products");
            }
            _ => {}
        }
    }
    validate_history_span(movements, None)
}
