//! Stock-in service: receiving goods onto the shelf

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{NewStockIn, StockInReceipt};
use shared::validation::validate_movement_quantity;

use crate::error::AppResult;
use crate::ledger::{LedgerError, LedgerResult};
use crate::store::{settle, LedgerStore, LedgerTx};

#[derive(Clone)]
pub struct StockInService {
    db: PgPool,
    store: Arc<dyn LedgerStore>,
}

/// Stock-in receipt joined with its spare part
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockInEntry {
    pub id: Uuid,
    pub spare_part_id: Uuid,
    pub spare_part_name: String,
    pub category: String,
    pub quantity: i32,
    pub stock_in_date: DateTime<Utc>,
}

impl StockInService {
    pub fn new(db: PgPool, store: Arc<dyn LedgerStore>) -> Self {
        Self { db, store }
    }

    /// Record received goods and raise the part's quantity in the same
    /// transaction
    pub async fn record(&self, input: NewStockIn) -> LedgerResult<StockInReceipt> {
        validate_movement_quantity(input.quantity)
            .map_err(|m| LedgerError::invalid("quantity", m))?;

        let mut tx = self.store.begin().await?;
        let outcome = receive_in(tx.as_mut(), &input).await;
        settle(tx, outcome).await
    }

    /// Receipts, newest first
    pub async fn list(&self) -> AppResult<Vec<StockInEntry>> {
        let entries = sqlx::query_as::<_, StockInEntry>(
            r#"
            SELECT si.id, si.spare_part_id, sp.name AS spare_part_name, sp.category,
                   si.quantity, si.stock_in_date
            FROM stock_in si
            JOIN spare_parts sp ON sp.id = si.spare_part_id
            ORDER BY si.stock_in_date DESC, si.id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }
}

async fn receive_in(tx: &mut dyn LedgerTx, input: &NewStockIn) -> LedgerResult<StockInReceipt> {
    tx.lock_spare_part(input.spare_part_id)
        .await?
        .ok_or_else(|| LedgerError::spare_part_not_found(input.spare_part_id))?;

    let quantity_after = tx
        .adjust_quantity(input.spare_part_id, input.quantity)
        .await?
        .ok_or_else(|| LedgerError::spare_part_not_found(input.spare_part_id))?;

    let record = tx.insert_stock_in(input.spare_part_id, input.quantity).await?;

    Ok(StockInReceipt {
        record,
        quantity_after,
    })
}
