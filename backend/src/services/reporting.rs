//! Reporting service for daily stock movement reports
//!
//! Movements belong to the UTC calendar day of their timestamp

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock_out::{StockOutEntry, STOCK_OUT_ENTRY_SELECT};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Stock-outs of one day with their totals
#[derive(Debug, Serialize)]
pub struct DailyStockOutReport {
    pub date: NaiveDate,
    pub entries: Vec<StockOutEntry>,
    pub total_quantity: i64,
    pub total_amount: Decimal,
}

/// Per-part balance and the day's movements
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockStatusRow {
    pub spare_part_id: Uuid,
    pub name: String,
    pub category: String,
    pub unit_price: Decimal,
    pub current_quantity: i32,
    pub total_stock_in: i64,
    pub total_stock_out: i64,
}

#[derive(Debug, Serialize)]
pub struct StockStatusReport {
    pub date: NaiveDate,
    pub parts: Vec<StockStatusRow>,
}

/// Half-open UTC interval `[start, end)` covering `date`
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

impl DailyStockOutReport {
    pub fn new(date: NaiveDate, entries: Vec<StockOutEntry>) -> Self {
        let total_quantity = entries.iter().map(|e| i64::from(e.quantity)).sum();
        let total_amount = entries.iter().map(|e| e.total_price).sum();
        Self {
            date,
            entries,
            total_quantity,
            total_amount,
        }
    }
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Stock-outs recorded on `date`, newest first
    pub async fn daily_stock_out(&self, date: NaiveDate) -> AppResult<DailyStockOutReport> {
        let (start, end) = day_bounds(date);
        let query = format!(
            r#"{}
            WHERE so.stock_out_date >= $1 AND so.stock_out_date < $2
            ORDER BY so.stock_out_date DESC, so.id
            "#,
            STOCK_OUT_ENTRY_SELECT
        );

        let entries = sqlx::query_as::<_, StockOutEntry>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.db)
            .await?;

        Ok(DailyStockOutReport::new(date, entries))
    }

    /// Every spare part with its current quantity and the quantities moved
    /// in and out on `date`
    pub async fn stock_status(&self, date: NaiveDate) -> AppResult<StockStatusReport> {
        let (start, end) = day_bounds(date);

        let parts = sqlx::query_as::<_, StockStatusRow>(
            r#"
            SELECT
                sp.id AS spare_part_id,
                sp.name,
                sp.category,
                sp.unit_price,
                sp.quantity AS current_quantity,
                COALESCE((
                    SELECT SUM(si.quantity) FROM stock_in si
                    WHERE si.spare_part_id = sp.id
                      AND si.stock_in_date >= $1 AND si.stock_in_date < $2
                ), 0)::BIGINT AS total_stock_in,
                COALESCE((
                    SELECT SUM(so.quantity) FROM stock_out so
                    WHERE so.spare_part_id = sp.id
                      AND so.stock_out_date >= $1 AND so.stock_out_date < $2
                ), 0)::BIGINT AS total_stock_out
            FROM spare_parts sp
            ORDER BY sp.name, sp.id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(StockStatusReport { date, parts })
    }
}
