//! Stock movement ledger models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ForecastError;

/// Note fragments the write side uses to flag a product creation
pub const CREATION_MARKERS: [&str; 2] = ["création", "creation"];

/// Separators the write side uses for an `old → new` quantity override
pub const OVERRIDE_ARROWS: [&str; 2] = ["→", "->"];

/// A stock movement as recorded by the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementRecord {
    #[serde(default)]
    pub id: Uuid,
    /// Absent once the product has been deleted
    pub product_id: Option<Uuid>,
    pub movement_type: MovementType,
    /// Non-negative magnitude; the sign follows from `movement_type`
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

impl MovementRecord {
    /// Calendar day (UTC) the movement belongs to
    pub fn date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Decode the note into explicit replay semantics
    pub fn semantics(&self) -> MovementSemantics {
        MovementSemantics::decode(self.note.as_deref())
    }

    /// Quantity with the sign implied by the movement type
    pub fn signed_quantity(&self) -> Decimal {
        if self.movement_type.is_inflow() {
            self.quantity
        } else {
            -self.quantity
        }
    }
}

/// Types of stock movements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Add,
    Sale,
    ManualWithdrawal,
    /// May carry the full removed quantity
    Deletion,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Add => "ADD",
            MovementType::Sale => "SALE",
            MovementType::ManualWithdrawal => "MANUAL_WITHDRAWAL",
            MovementType::Deletion => "DELETION",
        }
    }

    pub fn is_inflow(&self) -> bool {
        matches!(self, MovementType::Add)
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADD" => Ok(MovementType::Add),
            "SALE" => Ok(MovementType::Sale),
            "MANUAL_WITHDRAWAL" => Ok(MovementType::ManualWithdrawal),
            "DELETION" => Ok(MovementType::Deletion),
            _ => Err(ForecastError::UnknownMovementType(s.to_string())),
        }
    }
}

/// How a movement affects the running stock during replay
///
/// The ledger encodes creation and override intent as free text in the note.
/// That side channel is decoded exactly once, here, so replay never looks at
/// the note again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementSemantics {
    /// Apply the signed quantity to the running stock
    StandardDelta,
    /// Set the running stock to the movement quantity
    ExplicitCreation,
    /// Set the running stock to `target`, ignoring the stored quantity
    ExplicitOverride {
        previous: Option<Decimal>,
        target: Decimal,
    },
}

impl MovementSemantics {
    /// Decode the semantics carried by a ledger note
    ///
    /// Creation markers win over override arrows. An arrow whose right-hand
    /// side is not a non-negative number decodes as a plain delta.
    pub fn decode(note: Option<&str>) -> Self {
        let Some(note) = note else {
            return MovementSemantics::StandardDelta;
        };

        let lowered = note.to_lowercase();
        if CREATION_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            return MovementSemantics::ExplicitCreation;
        }

        for arrow in OVERRIDE_ARROWS {
            if let Some((before, after)) = note.split_once(arrow) {
                return match parse_override(before, after) {
                    Some(semantics) => semantics,
                    None => {
                        tracing::debug!(
                            note,
                            "Unparsable override note, applying movement as delta"
                        );
                        MovementSemantics::StandardDelta
                    }
                };
            }
        }

        MovementSemantics::StandardDelta
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementSemantics::StandardDelta => "standard_delta",
            MovementSemantics::ExplicitCreation => "explicit_creation",
            MovementSemantics::ExplicitOverride { .. } => "explicit_override",
        }
    }
}

fn parse_override(before: &str, after: &str) -> Option<MovementSemantics> {
    let target = leading_number(after)?;
    if target < Decimal::ZERO {
        return None;
    }
    Some(MovementSemantics::ExplicitOverride {
        previous: trailing_number(before),
        target,
    })
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | ',' | '-')
}

fn leading_number(text: &str) -> Option<Decimal> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !is_number_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    parse_decimal(&trimmed[..end])
}

fn trailing_number(text: &str) -> Option<Decimal> {
    let trimmed = text.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_number_char(*c))
        .last()
        .map(|(i, _)| i)?;
    parse_decimal(&trimmed[start..])
}

/// Accepts `,` as decimal separator and ignores trailing punctuation
fn parse_decimal(token: &str) -> Option<Decimal> {
    let token = token.trim_end_matches(['.', ',']);
    if token.is_empty() {
        return None;
    }
    Decimal::from_str(&token.replace(',', ".")).ok()
}
