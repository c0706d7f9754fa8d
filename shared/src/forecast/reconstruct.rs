//! Stock reconstruction: replay a movement ledger into daily stock levels

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    MovementRecord, MovementSemantics, MovementType, StockCorrection, StockHistory, StockPoint,
};

/// Mismatch between replayed and live stock tolerated before correcting
pub const DEFAULT_STOCK_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Parameters of a reconstruction run
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionOptions {
    /// Day the live stock was read; gets a point of its own
    pub today: NaiveDate,
    pub tolerance: Decimal,
}

impl ReconstructionOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            tolerance: DEFAULT_STOCK_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance.abs();
        self
    }
}

/// A ledger row with its note decoded, ready for replay
#[derive(Debug, Clone)]
struct DecodedMovement {
    created_at: DateTime<Utc>,
    id: Uuid,
    movement_type: MovementType,
    quantity: Decimal,
    signed_quantity: Decimal,
    semantics: MovementSemantics,
    note: Option<String>,
}

impl DecodedMovement {
    fn from_record(record: &MovementRecord) -> Self {
        Self {
            created_at: record.created_at,
            id: record.id,
            movement_type: record.movement_type,
            quantity: record.quantity,
            signed_quantity: record.signed_quantity(),
            semantics: record.semantics(),
            note: record.note.clone(),
        }
    }

    fn date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Total order over movements so that input order never matters
    fn replay_order(&self, other: &Self) -> std::cmp::Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.movement_type.cmp(&other.movement_type))
            .then_with(|| self.quantity.cmp(&other.quantity))
            .then_with(|| self.note.cmp(&other.note))
    }

    fn apply(&self, running: Decimal) -> Decimal {
        match self.semantics {
            MovementSemantics::ExplicitCreation => self.quantity,
            MovementSemantics::ExplicitOverride { target, .. } => target,
            MovementSemantics::StandardDelta => running + self.signed_quantity,
        }
    }
}

/// Replay `movements` into one stock point per calendar day
///
/// Movements are sorted chronologically and grouped by UTC date. Each day
/// ends clamped at zero. A point for `options.today` carrying the live stock
/// is appended when today is after the last movement day. If the replay ends
/// further than `options.tolerance` from `live_stock`, the final points are
/// forced to the live value and the mismatch is reported in
/// [`StockHistory::correction`].
pub fn reconstruct_history(
    movements: &[MovementRecord],
    live_stock: Decimal,
    options: &ReconstructionOptions,
) -> StockHistory {
    let mut decoded: Vec<DecodedMovement> =
        movements.iter().map(DecodedMovement::from_record).collect();
    decoded.sort_by(DecodedMovement::replay_order);

    let Some(first) = decoded.first() else {
        return StockHistory::default();
    };

    let origin = first.date();
    let mut current_day = origin;
    let mut running = Decimal::ZERO;
    let mut points = Vec::new();

    for movement in &decoded {
        let date = movement.date();
        if date != current_day {
            running = running.max(Decimal::ZERO);
            points.push(StockPoint::new(current_day, origin, running));
            current_day = date;
        }
        running = movement.apply(running);
    }
    running = running.max(Decimal::ZERO);
    points.push(StockPoint::new(current_day, origin, running));

    let last_movement_day = current_day;
    if options.today > last_movement_day {
        points.push(StockPoint::new(options.today, origin, live_stock));
    }

    let mut correction = None;
    if (running - live_stock).abs() > options.tolerance {
        tracing::warn!(
            computed = %running,
            live = %live_stock,
            day = %last_movement_day,
            "Reconstructed stock does not match live stock, correcting final points"
        );

        for point in points
            .iter_mut()
            .filter(|p| p.date == last_movement_day || p.date == options.today)
        {
            *point = StockPoint::new(point.date, origin, live_stock);
        }

        correction = Some(StockCorrection {
            computed: running,
            live: live_stock,
        });
    }

    StockHistory { points, correction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn movement(
        kind: MovementType,
        quantity: i64,
        when: DateTime<Utc>,
        note: Option<&str>,
    ) -> MovementRecord {
        MovementRecord {
            id: Uuid::new_v4(),
            product_id: None,
            movement_type: kind,
            quantity: Decimal::from(quantity),
            created_at: when,
            note: note.map(str::to_string),
        }
    }

    fn levels(history: &StockHistory) -> Vec<(u32, f64)> {
        history
            .points
            .iter()
            .map(|p| (p.days_since_epoch, p.stock_level))
            .collect()
    }

    #[test]
    fn test_default_tolerance_is_one_tenth() {
        assert_eq!(DEFAULT_STOCK_TOLERANCE.to_string(), "0.1");
    }

    #[test]
    fn test_empty_ledger() {
        let options = ReconstructionOptions::new(date(10));
        let history = reconstruct_history(&[], Decimal::from(12), &options);
        assert!(history.is_empty());
        assert!(!history.was_corrected());
    }

    #[test]
    fn test_same_day_movements_replay_in_time_order() {
        // Override at 09:00 then a sale at 15:00; reversed input order
        let movements = vec![
            movement(MovementType::Sale, 5, at(2, 15), None),
            movement(MovementType::Add, 3, at(2, 9), Some("Stock modifié: 10 → 40")),
            movement(MovementType::Add, 10, at(1, 8), Some("Création du produit")),
        ];

        let options = ReconstructionOptions::new(date(2));
        let history = reconstruct_history(&movements, Decimal::from(35), &options);
        assert_eq!(levels(&history), vec![(0, 10.0), (1, 35.0)]);
        assert!(!history.was_corrected());
    }

    #[test]
    fn test_negative_running_total_is_clamped_per_day() {
        let movements = vec![
            movement(MovementType::Add, 10, at(1, 8), Some("creation")),
            movement(MovementType::Sale, 25, at(2, 8), None),
            movement(MovementType::Add, 4, at(3, 8), None),
        ];

        let options = ReconstructionOptions::new(date(3));
        let history = reconstruct_history(&movements, Decimal::from(4), &options);
        assert_eq!(levels(&history), vec![(0, 10.0), (1, 0.0), (2, 4.0)]);
    }

    #[test]
    fn test_today_point_uses_live_stock() {
        let movements = vec![
            movement(MovementType::Add, 20, at(1, 8), Some("Création")),
            movement(MovementType::Sale, 5, at(3, 8), None),
        ];

        let options = ReconstructionOptions::new(date(8));
        let history = reconstruct_history(&movements, Decimal::from(15), &options);
        assert_eq!(levels(&history), vec![(0, 20.0), (2, 15.0), (7, 15.0)]);
        assert_eq!(history.origin(), Some(date(1)));
    }

    #[test]
    fn test_mismatch_corrects_last_day_and_today() {
        let movements = vec![
            movement(MovementType::Add, 20, at(1, 8), Some("Création")),
            movement(MovementType::Sale, 5, at(3, 8), None),
        ];

        let options = ReconstructionOptions::new(date(8));
        let history = reconstruct_history(&movements, Decimal::from(12), &options);
        assert_eq!(levels(&history), vec![(0, 20.0), (2, 12.0), (7, 12.0)]);
        assert_eq!(
            history.correction,
            Some(StockCorrection {
                computed: Decimal::from(15),
                live: Decimal::from(12),
            })
        );
    }

    #[test]
    fn test_mismatch_within_tolerance_is_ignored() {
        let movements = vec![movement(MovementType::Add, 20, at(1, 8), Some("Création"))];
        let live = Decimal::new(2005, 2); // 20.05

        let history = reconstruct_history(&movements, live, &ReconstructionOptions::new(date(1)));
        assert_eq!(levels(&history), vec![(0, 20.0)]);
        assert!(!history.was_corrected());
    }

    #[test]
    fn test_custom_tolerance() {
        let movements = vec![movement(MovementType::Add, 20, at(1, 8), Some("Création"))];
        let options = ReconstructionOptions::new(date(1)).with_tolerance(Decimal::from(5));

        let history = reconstruct_history(&movements, Decimal::from(17), &options);
        assert!(!history.was_corrected());
    }

    #[test]
    fn test_deletion_and_manual_withdrawal_subtract() {
        let movements = vec![
            movement(MovementType::Add, 50, at(1, 8), None),
            movement(MovementType::ManualWithdrawal, 10, at(2, 8), None),
            movement(MovementType::Deletion, 40, at(3, 8), None),
        ];

        let options = ReconstructionOptions::new(date(3));
        let history = reconstruct_history(&movements, Decimal::ZERO, &options);
        assert_eq!(levels(&history), vec![(0, 50.0), (1, 40.0), (2, 0.0)]);
    }
}
