//! Quantity deltas for revising a stock-out entry

use std::collections::BTreeMap;

use uuid::Uuid;

use shared::models::StockOutRecord;

/// How a revision moves stock between spare parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionPlan {
    /// The entry stays on its part; only the difference is applied
    SamePart { spare_part_id: Uuid, delta: i32 },

    /// The entry moves to another part: the old quantity goes back to the
    /// old part in full and the new quantity comes off the new part in full
    Transfer {
        from: Uuid,
        restore: i32,
        to: Uuid,
        deduct: i32,
    },
}

impl RevisionPlan {
    pub fn for_record(existing: &StockOutRecord, spare_part_id: Uuid, quantity: i32) -> Self {
        if existing.spare_part_id == spare_part_id {
            RevisionPlan::SamePart {
                spare_part_id,
                delta: existing.quantity - quantity,
            }
        } else {
            RevisionPlan::Transfer {
                from: existing.spare_part_id,
                restore: existing.quantity,
                to: spare_part_id,
                deduct: quantity,
            }
        }
    }

    /// Spare parts whose rows must be locked, in lock order
    pub fn parts_to_lock(&self) -> Vec<Uuid> {
        match *self {
            RevisionPlan::SamePart { spare_part_id, .. } => vec![spare_part_id],
            RevisionPlan::Transfer { from, to, .. } => {
                let mut parts = vec![from, to];
                parts.sort();
                parts
            }
        }
    }

    /// Signed quantity changes in application order; restoring always
    /// precedes deducting. A same-part revision with no quantity change
    /// yields nothing.
    pub fn deltas(&self) -> Vec<(Uuid, i32)> {
        match *self {
            RevisionPlan::SamePart { delta: 0, .. } => Vec::new(),
            RevisionPlan::SamePart {
                spare_part_id,
                delta,
            } => vec![(spare_part_id, delta)],
            RevisionPlan::Transfer {
                from,
                restore,
                to,
                deduct,
            } => vec![(from, restore), (to, -deduct)],
        }
    }

    /// Balances after applying the deltas to `on_hand`, or `None` on
    /// arithmetic overflow or when a touched part is missing from `on_hand`
    pub fn projected_balances(&self, on_hand: &BTreeMap<Uuid, i32>) -> Option<BTreeMap<Uuid, i32>> {
        let mut balances = on_hand.clone();
        for (part, delta) in self.deltas() {
            let balance = balances.get_mut(&part)?;
            *balance = balance.checked_add(delta)?;
        }
        Some(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn record(spare_part_id: Uuid, quantity: i32) -> StockOutRecord {
        StockOutRecord {
            id: Uuid::new_v4(),
            spare_part_id,
            quantity,
            unit_price: Decimal::new(200, 2),
            total_price: Decimal::new(200, 2) * Decimal::from(quantity),
            stock_out_date: Utc::now(),
        }
    }

    #[test]
    fn test_smaller_sale_returns_stock() {
        let part = Uuid::new_v4();
        let plan = RevisionPlan::for_record(&record(part, 5), part, 3);
        assert_eq!(
            plan,
            RevisionPlan::SamePart {
                spare_part_id: part,
                delta: 2
            }
        );
        assert_eq!(plan.deltas(), vec![(part, 2)]);
    }

    #[test]
    fn test_larger_sale_consumes_stock() {
        let part = Uuid::new_v4();
        let plan = RevisionPlan::for_record(&record(part, 3), part, 8);
        assert_eq!(plan.deltas(), vec![(part, -5)]);
    }

    #[test]
    fn test_price_only_change_moves_nothing() {
        let part = Uuid::new_v4();
        let plan = RevisionPlan::for_record(&record(part, 4), part, 4);
        assert!(plan.deltas().is_empty());
        assert_eq!(plan.parts_to_lock(), vec![part]);
    }

    #[test]
    fn test_transfer_restores_before_deducting() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let plan = RevisionPlan::for_record(&record(a, 4), b, 3);
        assert_eq!(plan.deltas(), vec![(a, 4), (b, -3)]);
    }

    #[test]
    fn test_transfer_locks_in_id_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let forward = RevisionPlan::for_record(&record(a, 1), b, 1).parts_to_lock();
        let backward = RevisionPlan::for_record(&record(b, 1), a, 1).parts_to_lock();
        assert_eq!(forward, backward);
        assert!(forward[0] < forward[1]);
    }

    #[test]
    fn test_projected_balances() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let on_hand = BTreeMap::from([(a, 6), (b, 2)]);
        let plan = RevisionPlan::for_record(&record(a, 4), b, 3);
        let projected = plan.projected_balances(&on_hand).unwrap();
        assert_eq!(projected[&a], 10);
        assert_eq!(projected[&b], -1);
    }

    #[test]
    fn test_projection_overflow_is_none() {
        let part = Uuid::new_v4();
        let other = Uuid::new_v4();
        let on_hand = BTreeMap::from([(part, i32::MAX), (other, 0)]);
        let plan = RevisionPlan::for_record(&record(part, 1), other, 1);
        assert!(plan.projected_balances(&on_hand).is_none());
    }
}
