//! Product stock models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Live stock of a product as held by the product store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductStock {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    /// Level below which the UI raises a low-stock alert
    pub alert_threshold: Option<Decimal>,
}
