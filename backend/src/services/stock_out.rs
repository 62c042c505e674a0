//! Read side of the stock-out ledger
//!
//! Writes and point reads go through [`crate::ledger::StockLedger`]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Clone)]
pub struct StockOutService {
    db: PgPool,
}

/// Stock-out entry joined with its spare part
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockOutEntry {
    pub id: Uuid,
    pub spare_part_id: Uuid,
    pub spare_part_name: String,
    pub category: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub stock_out_date: DateTime<Utc>,
}

pub(crate) const STOCK_OUT_ENTRY_SELECT: &str = r#"
    SELECT so.id, so.spare_part_id, sp.name AS spare_part_name, sp.category,
           so.quantity, so.unit_price, so.total_price, so.stock_out_date
    FROM stock_out so
    JOIN spare_parts sp ON sp.id = so.spare_part_id
"#;

impl StockOutService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Entries, newest first
    pub async fn list(&self) -> AppResult<Vec<StockOutEntry>> {
        let query = format!(
            "{} ORDER BY so.stock_out_date DESC, so.id",
            STOCK_OUT_ENTRY_SELECT
        );
        let entries = sqlx::query_as::<_, StockOutEntry>(&query)
            .fetch_all(&self.db)
            .await?;

        Ok(entries)
    }
}
