//! Stock-out ledger
//!
//! Records, revises and revokes stock-out entries. Each operation runs in a
//! single store transaction that covers both the entry and every spare part
//! quantity it touches, so either all of it becomes visible or none of it
//! does. Row locks are always taken entry first, then spare parts in
//! ascending id order.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use shared::models::{
    QuantityAdjustment, StockOutInput, StockOutRecord, StockOutRevision, StockOutRevocation,
};
use shared::validation::{
    validate_line_total, validate_movement_quantity, validate_unit_price,
};

use crate::store::{settle, LedgerStore, LedgerTx, StockOutWrite};

mod error;
mod plan;

pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use plan::RevisionPlan;

/// Behaviour switches for the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    /// When false, a revision that would leave any spare part with a
    /// negative quantity is refused
    pub allow_negative_stock_on_revise: bool,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            allow_negative_stock_on_revise: true,
        }
    }
}

#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn LedgerStore>,
    policy: LedgerPolicy,
}

impl StockLedger {
    pub fn new(store: Arc<dyn LedgerStore>, policy: LedgerPolicy) -> Self {
        Self { store, policy }
    }

    /// Record a sale: deduct `quantity` from the spare part and add an entry
    /// priced at `unit_price`
    pub async fn record_stock_out(&self, input: &StockOutInput) -> LedgerResult<StockOutRecord> {
        validate_stock_out(input)?;

        let mut tx = self.store.begin().await?;
        let outcome = record_in(tx.as_mut(), input).await;
        settle(tx, outcome).await
    }

    /// Replace the part, quantity and unit price of an existing entry and
    /// rebalance the affected spare parts
    pub async fn revise_stock_out(
        &self,
        id: Uuid,
        input: &StockOutInput,
    ) -> LedgerResult<StockOutRevision> {
        validate_stock_out(input)?;

        let mut tx = self.store.begin().await?;
        let outcome = revise_in(tx.as_mut(), self.policy, id, input).await;
        settle(tx, outcome).await
    }

    /// Delete an entry and put its quantity back on the shelf
    pub async fn revoke_stock_out(&self, id: Uuid) -> LedgerResult<StockOutRevocation> {
        let mut tx = self.store.begin().await?;
        let outcome = revoke_in(tx.as_mut(), id).await;
        settle(tx, outcome).await
    }

    pub async fn stock_out(&self, id: Uuid) -> LedgerResult<StockOutRecord> {
        self.store
            .stock_out(id)
            .await?
            .ok_or_else(|| LedgerError::stock_out_not_found(id))
    }
}

fn validate_stock_out(input: &StockOutInput) -> LedgerResult<()> {
    validate_movement_quantity(input.quantity).map_err(|m| LedgerError::invalid("quantity", m))?;
    validate_unit_price(input.unit_price).map_err(|m| LedgerError::invalid("unit_price", m))?;
    validate_line_total(input.quantity, input.unit_price)
        .map_err(|m| LedgerError::invalid("quantity", m))?;
    Ok(())
}

async fn record_in(tx: &mut dyn LedgerTx, input: &StockOutInput) -> LedgerResult<StockOutRecord> {
    let part = tx
        .lock_spare_part(input.spare_part_id)
        .await?
        .ok_or_else(|| LedgerError::spare_part_not_found(input.spare_part_id))?;

    if part.quantity < input.quantity {
        return Err(LedgerError::InsufficientStock {
            spare_part_id: part.id,
            requested: input.quantity,
            on_hand: part.quantity,
        });
    }

    tx.adjust_quantity(part.id, -input.quantity)
        .await?
        .ok_or_else(|| LedgerError::spare_part_not_found(part.id))?;

    let write = StockOutWrite::priced(part.id, input.quantity, input.unit_price);
    Ok(tx.insert_stock_out(&write).await?)
}

async fn revise_in(
    tx: &mut dyn LedgerTx,
    policy: LedgerPolicy,
    id: Uuid,
    input: &StockOutInput,
) -> LedgerResult<StockOutRevision> {
    let existing = tx
        .lock_stock_out(id)
        .await?
        .ok_or_else(|| LedgerError::stock_out_not_found(id))?;

    let plan = RevisionPlan::for_record(&existing, input.spare_part_id, input.quantity);

    let mut on_hand = BTreeMap::new();
    for part_id in plan.parts_to_lock() {
        let part = tx
            .lock_spare_part(part_id)
            .await?
            .ok_or_else(|| LedgerError::spare_part_not_found(part_id))?;
        on_hand.insert(part_id, part.quantity);
    }

    let projected = plan
        .projected_balances(&on_hand)
        .ok_or_else(|| LedgerError::invalid("quantity", "quantity out of range"))?;

    if !policy.allow_negative_stock_on_revise {
        if let Some((&spare_part_id, &quantity_after)) =
            projected.iter().find(|(_, quantity)| **quantity < 0)
        {
            return Err(LedgerError::NegativeStock {
                spare_part_id,
                quantity_after,
            });
        }
    }

    let mut adjustments = Vec::new();
    for (spare_part_id, delta) in plan.deltas() {
        let quantity_after = tx
            .adjust_quantity(spare_part_id, delta)
            .await?
            .ok_or_else(|| LedgerError::spare_part_not_found(spare_part_id))?;
        adjustments.push(QuantityAdjustment {
            spare_part_id,
            delta,
            quantity_after,
        });
    }

    let write = StockOutWrite::priced(input.spare_part_id, input.quantity, input.unit_price);
    let record = tx
        .update_stock_out(id, &write)
        .await?
        .ok_or_else(|| LedgerError::stock_out_not_found(id))?;

    Ok(StockOutRevision {
        record,
        stock_adjustment: existing.quantity - input.quantity,
        old_spare_part_id: existing.spare_part_id,
        new_spare_part_id: input.spare_part_id,
        adjustments,
    })
}

async fn revoke_in(tx: &mut dyn LedgerTx, id: Uuid) -> LedgerResult<StockOutRevocation> {
    let record = tx
        .lock_stock_out(id)
        .await?
        .ok_or_else(|| LedgerError::stock_out_not_found(id))?;

    tx.lock_spare_part(record.spare_part_id)
        .await?
        .ok_or_else(|| LedgerError::spare_part_not_found(record.spare_part_id))?;

    let quantity_after = tx
        .adjust_quantity(record.spare_part_id, record.quantity)
        .await?
        .ok_or_else(|| LedgerError::spare_part_not_found(record.spare_part_id))?;

    if !tx.delete_stock_out(id).await? {
        return Err(LedgerError::stock_out_not_found(id));
    }

    Ok(StockOutRevocation {
        record_id: record.id,
        spare_part_id: record.spare_part_id,
        restored_quantity: record.quantity,
        quantity_after,
    })
}
