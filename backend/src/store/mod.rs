//! Relational store seam for the stock write path
//!
//! The ledger and the stock-in service only talk to the store through
//! [`LedgerStore`] and the transactions it hands out. A transaction is an
//! owned value: it is released by [`LedgerTx::commit`], by
//! [`LedgerTx::rollback`], or by being dropped, which rolls it back.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use shared::models::{
    line_total, to_currency, NewSparePart, SparePart, StockInRecord, StockOutRecord,
};

pub mod memory;
pub mod postgres;

pub use memory::{FaultPoint, InMemoryLedgerStore};
pub use postgres::PgLedgerStore;

/// Store failure, classified by what the caller can do about it
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row lock could not be taken in time, or the transaction lost a
    /// serialization race
    #[error("concurrent modification: {0}")]
    Conflict(String),

    /// The store could not be reached or gave up on the connection
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A schema constraint rejected the write
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Column values written for a stock-out entry.
///
/// Only constructible through [`StockOutWrite::priced`], so the total is
/// always derived from the quantity and unit price being written.
#[derive(Debug, Clone, PartialEq)]
pub struct StockOutWrite {
    spare_part_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl StockOutWrite {
    pub fn priced(spare_part_id: Uuid, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            spare_part_id,
            quantity,
            unit_price: to_currency(unit_price),
            total_price: line_total(quantity, unit_price),
        }
    }

    pub fn spare_part_id(&self) -> Uuid {
        self.spare_part_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }
}

/// Handle to the store, shared by every request
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> StoreResult<Box<dyn LedgerTx>>;

    /// Point read of a spare part outside any transaction
    async fn spare_part(&self, id: Uuid) -> StoreResult<Option<SparePart>>;

    /// Point read of a stock-out entry outside any transaction
    async fn stock_out(&self, id: Uuid) -> StoreResult<Option<StockOutRecord>>;
}

/// An open store transaction.
///
/// `lock_*` reads take a row lock held until the transaction ends.
#[async_trait]
pub trait LedgerTx: Send {
    async fn lock_spare_part(&mut self, id: Uuid) -> StoreResult<Option<SparePart>>;

    async fn lock_stock_out(&mut self, id: Uuid) -> StoreResult<Option<StockOutRecord>>;

    /// Add `delta` to a spare part's quantity, returning the new quantity,
    /// or `None` when the part does not exist
    async fn adjust_quantity(&mut self, id: Uuid, delta: i32) -> StoreResult<Option<i32>>;

    async fn insert_spare_part(&mut self, part: &NewSparePart) -> StoreResult<SparePart>;

    async fn insert_stock_in(&mut self, spare_part_id: Uuid, quantity: i32)
        -> StoreResult<StockInRecord>;

    async fn insert_stock_out(&mut self, entry: &StockOutWrite) -> StoreResult<StockOutRecord>;

    /// Overwrite the mutable columns of an entry in place
    async fn update_stock_out(
        &mut self,
        id: Uuid,
        entry: &StockOutWrite,
    ) -> StoreResult<Option<StockOutRecord>>;

    /// Returns whether a row was deleted
    async fn delete_stock_out(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// End a transaction according to the outcome of the work done in it:
/// commit on success, roll back on failure.
///
/// The work's own error wins over a failed rollback, which is only logged;
/// the store discards the transaction either way once it is dropped.
pub async fn settle<T, E>(tx: Box<dyn LedgerTx>, outcome: Result<T, E>) -> Result<T, E>
where
    E: From<StoreError>,
{
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    error = %rollback_err,
                    "Rollback failed after an aborted ledger operation"
                );
            }
            Err(err)
        }
    }
}
