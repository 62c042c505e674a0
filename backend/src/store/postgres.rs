//! PostgreSQL implementation of the ledger store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{NewSparePart, SparePart, StockInRecord, StockOutRecord};

use super::{LedgerStore, LedgerTx, StockOutWrite, StoreError, StoreResult};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // lock_not_available, serialization_failure, deadlock_detected
                Some("55P03" | "40001" | "40P01") => StoreError::Conflict(db.message().to_string()),
                Some(code) if code.starts_with("23") || code == "22003" => {
                    StoreError::Constraint(db.message().to_string())
                }
                _ => StoreError::Backend(err.to_string()),
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SparePartRow {
    id: Uuid,
    name: String,
    category: String,
    quantity: i32,
    unit_price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<SparePartRow> for SparePart {
    fn from(row: SparePartRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            quantity: row.quantity,
            unit_price: row.unit_price,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct StockInRow {
    id: Uuid,
    spare_part_id: Uuid,
    quantity: i32,
    stock_in_date: DateTime<Utc>,
}

impl From<StockInRow> for StockInRecord {
    fn from(row: StockInRow) -> Self {
        Self {
            id: row.id,
            spare_part_id: row.spare_part_id,
            quantity: row.quantity,
            stock_in_date: row.stock_in_date,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct StockOutRow {
    id: Uuid,
    spare_part_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
    stock_out_date: DateTime<Utc>,
}

impl From<StockOutRow> for StockOutRecord {
    fn from(row: StockOutRow) -> Self {
        Self {
            id: row.id,
            spare_part_id: row.spare_part_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
            stock_out_date: row.stock_out_date,
        }
    }
}

/// Ledger store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgLedgerStore {
    db: PgPool,
    lock_timeout_ms: u64,
}

impl PgLedgerStore {
    /// `lock_timeout_ms` bounds how long a transaction waits for a row lock
    /// before failing with a conflict
    pub fn new(db: PgPool, lock_timeout_ms: u64) -> Self {
        Self {
            db,
            lock_timeout_ms,
        }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> StoreResult<Box<dyn LedgerTx>> {
        let mut tx = self.db.begin().await?;

        // SET does not take bind parameters
        sqlx::query(&format!("SET LOCAL lock_timeout = '{}ms'", self.lock_timeout_ms))
            .execute(&mut *tx)
            .await?;

        tracing::debug!("ledger transaction opened");
        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn spare_part(&self, id: Uuid) -> StoreResult<Option<SparePart>> {
        let row = sqlx::query_as::<_, SparePartRow>(
            "SELECT id, name, category, quantity, unit_price, created_at FROM spare_parts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn stock_out(&self, id: Uuid) -> StoreResult<Option<StockOutRecord>> {
        let row = sqlx::query_as::<_, StockOutRow>(
            r#"
            SELECT id, spare_part_id, quantity, unit_price, total_price, stock_out_date
            FROM stock_out
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }
}

struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn lock_spare_part(&mut self, id: Uuid) -> StoreResult<Option<SparePart>> {
        let row = sqlx::query_as::<_, SparePartRow>(
            r#"
            SELECT id, name, category, quantity, unit_price, created_at
            FROM spare_parts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn lock_stock_out(&mut self, id: Uuid) -> StoreResult<Option<StockOutRecord>> {
        let row = sqlx::query_as::<_, StockOutRow>(
            r#"
            SELECT id, spare_part_id, quantity, unit_price, total_price, stock_out_date
            FROM stock_out
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn adjust_quantity(&mut self, id: Uuid, delta: i32) -> StoreResult<Option<i32>> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "UPDATE spare_parts SET quantity = quantity + $1 WHERE id = $2 RETURNING quantity",
        )
        .bind(delta)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(quantity)
    }

    async fn insert_spare_part(&mut self, part: &NewSparePart) -> StoreResult<SparePart> {
        let row = sqlx::query_as::<_, SparePartRow>(
            r#"
            INSERT INTO spare_parts (name, category, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, category, quantity, unit_price, created_at
            "#,
        )
        .bind(&part.name)
        .bind(&part.category)
        .bind(part.quantity)
        .bind(part.unit_price)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn insert_stock_in(
        &mut self,
        spare_part_id: Uuid,
        quantity: i32,
    ) -> StoreResult<StockInRecord> {
        let row = sqlx::query_as::<_, StockInRow>(
            r#"
            INSERT INTO stock_in (spare_part_id, quantity)
            VALUES ($1, $2)
            RETURNING id, spare_part_id, quantity, stock_in_date
            "#,
        )
        .bind(spare_part_id)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn insert_stock_out(&mut self, entry: &StockOutWrite) -> StoreResult<StockOutRecord> {
        let row = sqlx::query_as::<_, StockOutRow>(
            r#"
            INSERT INTO stock_out (spare_part_id, quantity, unit_price, total_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, spare_part_id, quantity, unit_price, total_price, stock_out_date
            "#,
        )
        .bind(entry.spare_part_id())
        .bind(entry.quantity())
        .bind(entry.unit_price())
        .bind(entry.total_price())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn update_stock_out(
        &mut self,
        id: Uuid,
        entry: &StockOutWrite,
    ) -> StoreResult<Option<StockOutRecord>> {
        let row = sqlx::query_as::<_, StockOutRow>(
            r#"
            UPDATE stock_out
            SET spare_part_id = $1, quantity = $2, unit_price = $3, total_price = $4
            WHERE id = $5
            RETURNING id, spare_part_id, quantity, unit_price, total_price, stock_out_date
            "#,
        )
        .bind(entry.spare_part_id())
        .bind(entry.quantity())
        .bind(entry.unit_price())
        .bind(entry.total_price())
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_stock_out(&mut self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM stock_out WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let PgLedgerTx { tx } = *self;
        tx.commit().await?;
        tracing::debug!("ledger transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let PgLedgerTx { tx } = *self;
        tx.rollback().await?;
        tracing::debug!("ledger transaction rolled back");
        Ok(())
    }
}
