//! Read-only access to the stock movement ledger and live product stock
//!
//! The ledger is written by the product management screens; this service only
//! reads the snapshot the forecasting pipeline consumes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{MovementRecord, MovementType, ProductStock};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Ledger reader backed by the `stock_movements` and `products` tables
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Row for ledger query
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Option<Uuid>,
    movement_type: String,
    quantity: Decimal,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_record(self) -> Option<MovementRecord> {
        let movement_type = match self.movement_type.parse::<MovementType>() {
            Ok(kind) => kind,
            Err(err) => {
                tracing::warn!(movement_id = %self.id, "Skipping ledger row: {}", err);
                return None;
            }
        };

        Some(MovementRecord {
            id: self.id,
            product_id: self.product_id,
            movement_type,
            quantity: self.quantity.abs(),
            created_at: self.created_at,
            note: self.note,
        })
    }
}

/// Row for product stock query
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    quantity: Decimal,
    alert_threshold: Option<Decimal>,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get every recorded movement for a product, oldest first
    pub async fn fetch_movements(&self, product_id: Uuid) -> AppResult<Vec<MovementRecord>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, movement_type, quantity, note, created_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        let total = rows.len();
        let movements: Vec<MovementRecord> =
            rows.into_iter().filter_map(MovementRow::into_record).collect();

        tracing::debug!(
            %product_id,
            movements = movements.len(),
            skipped = total - movements.len(),
            "Loaded ledger snapshot"
        );

        Ok(movements)
    }

    /// Get the live stock of a product
    pub async fn fetch_product_stock(&self, product_id: Uuid) -> AppResult<ProductStock> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, quantity, alert_threshold
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(ProductStock {
            product_id: row.id,
            name: row.name,
            quantity: row.quantity,
            alert_threshold: row.alert_threshold,
        })
    }
}
