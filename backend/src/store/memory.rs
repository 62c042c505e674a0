//! In-memory store for tests and local development
//!
//! A transaction holds the store-wide lock from `begin` until it ends and
//! writes to a private copy of the tables, which replaces the committed
//! tables only on commit. Transactions are therefore fully serialised, and a
//! dropped or failed transaction leaves no trace.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use shared::models::{NewSparePart, SparePart, StockInRecord, StockOutRecord};

use super::{LedgerStore, LedgerTx, StockOutWrite, StoreError, StoreResult};

#[derive(Debug, Clone, Default)]
struct Tables {
    spare_parts: HashMap<Uuid, SparePart>,
    stock_in: HashMap<Uuid, StockInRecord>,
    stock_out: HashMap<Uuid, StockOutRecord>,
}

impl Tables {
    fn require_part(&self, id: Uuid) -> StoreResult<()> {
        if self.spare_parts.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Constraint(format!(
                "spare part {} does not exist",
                id
            )))
        }
    }
}

/// Store operations that can be made to fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    AdjustQuantity,
    InsertStockIn,
    InsertStockOut,
    UpdateStockOut,
    DeleteStockOut,
    Commit,
    Rollback,
}

type Faults = Arc<StdMutex<HashSet<FaultPoint>>>;

fn trip(faults: &Faults, point: FaultPoint) -> StoreResult<()> {
    let armed = faults
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .contains(&point);
    if armed {
        return Err(StoreError::Unavailable(format!("injected fault at {:?}", point)));
    }
    Ok(())
}

/// In-memory [`LedgerStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    tables: Arc<Mutex<Tables>>,
    faults: Faults,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `point` fail until the fault is cleared
    pub fn inject_fault(&self, point: FaultPoint) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(point);
    }

    pub fn clear_faults(&self) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Committed stock-out entries, oldest first
    pub async fn stock_out_records(&self) -> Vec<StockOutRecord> {
        let tables = self.tables.lock().await;
        let mut records: Vec<_> = tables.stock_out.values().cloned().collect();
        records.sort_by_key(|r| (r.stock_out_date, r.id));
        records
    }

    /// Committed stock-in receipts, oldest first
    pub async fn stock_in_records(&self) -> Vec<StockInRecord> {
        let tables = self.tables.lock().await;
        let mut records: Vec<_> = tables.stock_in.values().cloned().collect();
        records.sort_by_key(|r| (r.stock_in_date, r.id));
        records
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> StoreResult<Box<dyn LedgerTx>> {
        let committed = self.tables.clone().lock_owned().await;
        let staged = committed.clone();
        Ok(Box::new(InMemoryTx {
            committed,
            staged,
            faults: self.faults.clone(),
        }))
    }

    async fn spare_part(&self, id: Uuid) -> StoreResult<Option<SparePart>> {
        Ok(self.tables.lock().await.spare_parts.get(&id).cloned())
    }

    async fn stock_out(&self, id: Uuid) -> StoreResult<Option<StockOutRecord>> {
        Ok(self.tables.lock().await.stock_out.get(&id).cloned())
    }
}

struct InMemoryTx {
    committed: OwnedMutexGuard<Tables>,
    staged: Tables,
    faults: Faults,
}

#[async_trait]
impl LedgerTx for InMemoryTx {
    async fn lock_spare_part(&mut self, id: Uuid) -> StoreResult<Option<SparePart>> {
        Ok(self.staged.spare_parts.get(&id).cloned())
    }

    async fn lock_stock_out(&mut self, id: Uuid) -> StoreResult<Option<StockOutRecord>> {
        Ok(self.staged.stock_out.get(&id).cloned())
    }

    async fn adjust_quantity(&mut self, id: Uuid, delta: i32) -> StoreResult<Option<i32>> {
        trip(&self.faults, FaultPoint::AdjustQuantity)?;
        let Some(part) = self.staged.spare_parts.get_mut(&id) else {
            return Ok(None);
        };
        part.quantity = part
            .quantity
            .checked_add(delta)
            .ok_or_else(|| StoreError::Constraint("quantity out of range".to_string()))?;
        Ok(Some(part.quantity))
    }

    async fn insert_spare_part(&mut self, part: &NewSparePart) -> StoreResult<SparePart> {
        let row = SparePart {
            id: Uuid::new_v4(),
            name: part.name.clone(),
            category: part.category.clone(),
            quantity: part.quantity,
            unit_price: part.unit_price,
            created_at: Utc::now(),
        };
        self.staged.spare_parts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_stock_in(
        &mut self,
        spare_part_id: Uuid,
        quantity: i32,
    ) -> StoreResult<StockInRecord> {
        trip(&self.faults, FaultPoint::InsertStockIn)?;
        self.staged.require_part(spare_part_id)?;
        let row = StockInRecord {
            id: Uuid::new_v4(),
            spare_part_id,
            quantity,
            stock_in_date: Utc::now(),
        };
        self.staged.stock_in.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_stock_out(&mut self, entry: &StockOutWrite) -> StoreResult<StockOutRecord> {
        trip(&self.faults, FaultPoint::InsertStockOut)?;
        self.staged.require_part(entry.spare_part_id())?;
        let row = StockOutRecord {
            id: Uuid::new_v4(),
            spare_part_id: entry.spare_part_id(),
            quantity: entry.quantity(),
            unit_price: entry.unit_price(),
            total_price: entry.total_price(),
            stock_out_date: Utc::now(),
        };
        self.staged.stock_out.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_stock_out(
        &mut self,
        id: Uuid,
        entry: &StockOutWrite,
    ) -> StoreResult<Option<StockOutRecord>> {
        trip(&self.faults, FaultPoint::UpdateStockOut)?;
        self.staged.require_part(entry.spare_part_id())?;
        let Some(row) = self.staged.stock_out.get_mut(&id) else {
            return Ok(None);
        };
        row.spare_part_id = entry.spare_part_id();
        row.quantity = entry.quantity();
        row.unit_price = entry.unit_price();
        row.total_price = entry.total_price();
        Ok(Some(row.clone()))
    }

    async fn delete_stock_out(&mut self, id: Uuid) -> StoreResult<bool> {
        trip(&self.faults, FaultPoint::DeleteStockOut)?;
        Ok(self.staged.stock_out.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        trip(&self.faults, FaultPoint::Commit)?;
        let InMemoryTx {
            mut committed,
            staged,
            ..
        } = *self;
        *committed = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        trip(&self.faults, FaultPoint::Rollback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_part(quantity: i32) -> NewSparePart {
        NewSparePart {
            name: "Spark plug".to_string(),
            category: "Ignition".to_string(),
            quantity,
            unit_price: Decimal::new(450, 2),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_staged_writes() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        let part = tx.insert_spare_part(&new_part(3)).await.unwrap();
        assert_eq!(tx.adjust_quantity(part.id, 2).await.unwrap(), Some(5));
        tx.commit().await.unwrap();

        let stored = store.spare_part(part.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_trace() {
        let store = InMemoryLedgerStore::new();
        let part_id = {
            let mut tx = store.begin().await.unwrap();
            let part = tx.insert_spare_part(&new_part(3)).await.unwrap();
            part.id
        };
        assert!(store.spare_part(part_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stock_out_requires_existing_part() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        let write = StockOutWrite::priced(Uuid::new_v4(), 1, Decimal::ONE);
        let err = tx.insert_stock_out(&write).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_adjust_missing_part_reports_none() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.adjust_quantity(Uuid::new_v4(), 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_injected_commit_fault_discards_writes() {
        let store = InMemoryLedgerStore::new();
        store.inject_fault(FaultPoint::Commit);

        let mut tx = store.begin().await.unwrap();
        let part = tx.insert_spare_part(&new_part(1)).await.unwrap();
        assert!(matches!(tx.commit().await, Err(StoreError::Unavailable(_))));
        assert!(store.spare_part(part.id).await.unwrap().is_none());

        store.clear_faults();
        let tx = store.begin().await.unwrap();
        assert!(tx.commit().await.is_ok());
    }
}
