//! Property tests for the stock balance invariant
//!
//! After any sequence of stock-ins and stock-out records, revisions and
//! revocations, every spare part satisfies
//! `quantity = opening + received - sum(active stock-out quantities)`.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{lazy_pool, quantity_of, seed_part};
use shared::models::{NewStockIn, StockOutInput};
use sims_backend::ledger::{LedgerPolicy, StockLedger};
use sims_backend::services::StockInService;
use sims_backend::store::{FaultPoint, InMemoryLedgerStore};

const PARTS: usize = 3;

// ============================================================================
// Property Test Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Receive { part: usize, quantity: i32 },
    Record { part: usize, quantity: i32, cents: i64 },
    Revise { entry: usize, part: usize, quantity: i32, cents: i64 },
    Revoke { entry: usize },
    /// The next operation fails at the given store step
    Fault(FaultPoint),
}

fn fault_strategy() -> impl Strategy<Value = FaultPoint> {
    prop_oneof![
        Just(FaultPoint::AdjustQuantity),
        Just(FaultPoint::InsertStockIn),
        Just(FaultPoint::InsertStockOut),
        Just(FaultPoint::UpdateStockOut),
        Just(FaultPoint::DeleteStockOut),
        Just(FaultPoint::Commit),
        Just(FaultPoint::Rollback),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let part = 0..PARTS;
    let quantity = 1..15i32;
    let cents = 0..10_000i64;
    prop_oneof![
        1 => (part.clone(), quantity.clone())
            .prop_map(|(part, quantity)| Op::Receive { part, quantity }),
        3 => (part.clone(), quantity.clone(), cents.clone())
            .prop_map(|(part, quantity, cents)| Op::Record { part, quantity, cents }),
        2 => (any::<usize>(), part, quantity, cents).prop_map(|(entry, part, quantity, cents)| {
            Op::Revise { entry, part, quantity, cents }
        }),
        1 => any::<usize>().prop_map(|entry| Op::Revoke { entry }),
        1 => fault_strategy().prop_map(Op::Fault),
    ]
}

fn policy_strategy() -> impl Strategy<Value = LedgerPolicy> {
    any::<bool>().prop_map(|allow| LedgerPolicy {
        allow_negative_stock_on_revise: allow,
    })
}

// ============================================================================
// Property Tests
// ============================================================================

/// Applies `ops` and checks the invariant after every step
async fn run(openings: Vec<i32>, policy: LedgerPolicy, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let store = InMemoryLedgerStore::new();
    let ledger = StockLedger::new(Arc::new(store.clone()), policy);
    let stock_in = StockInService::new(lazy_pool(), Arc::new(store.clone()));

    let mut parts = Vec::new();
    for (i, opening) in openings.iter().enumerate() {
        parts.push(seed_part(&store, &format!("Part {}", i), *opening).await.id);
    }

    let mut received: HashMap<Uuid, i64> = HashMap::new();

    for op in ops {
        let entries = store.stock_out_records().await;
        match op {
            Op::Fault(point) => {
                store.inject_fault(point);
                continue;
            }
            Op::Receive { part, quantity } => {
                let input = NewStockIn {
                    spare_part_id: parts[part],
                    quantity,
                };
                if stock_in.record(input).await.is_ok() {
                    *received.entry(parts[part]).or_default() += i64::from(quantity);
                }
            }
            Op::Record { part, quantity, cents } => {
                let input = StockOutInput {
                    spare_part_id: parts[part],
                    quantity,
                    unit_price: Decimal::new(cents, 2),
                };
                let _ = ledger.record_stock_out(&input).await;
            }
            Op::Revise { entry, part, quantity, cents } if !entries.is_empty() => {
                let id = entries[entry % entries.len()].id;
                let input = StockOutInput {
                    spare_part_id: parts[part],
                    quantity,
                    unit_price: Decimal::new(cents, 2),
                };
                let _ = ledger.revise_stock_out(id, &input).await;
            }
            Op::Revoke { entry } if !entries.is_empty() => {
                let id = entries[entry % entries.len()].id;
                let _ = ledger.revoke_stock_out(id).await;
            }
            Op::Revise { .. } | Op::Revoke { .. } => {}
        }
        store.clear_faults();

        let active = store.stock_out_records().await;
        let receipts = store.stock_in_records().await;
        for (i, part) in parts.iter().enumerate() {
            let logged: i64 = receipts
                .iter()
                .filter(|r| r.spare_part_id == *part)
                .map(|r| i64::from(r.quantity))
                .sum();
            prop_assert_eq!(logged, received.get(part).copied().unwrap_or(0));

            let sold: i64 = active
                .iter()
                .filter(|r| r.spare_part_id == *part)
                .map(|r| i64::from(r.quantity))
                .sum();
            let expected =
                i64::from(openings[i]) + received.get(part).copied().unwrap_or(0) - sold;
            prop_assert_eq!(i64::from(quantity_of(&store, *part).await), expected);

            if !policy.allow_negative_stock_on_revise {
                prop_assert!(quantity_of(&store, *part).await >= 0);
            }
        }

        for record in &active {
            prop_assert_eq!(
                record.total_price,
                (Decimal::from(record.quantity) * record.unit_price).round_dp(2)
            );
        }
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Balance invariant holds across arbitrary ledger activity, including
    /// operations that fail part-way through
    #[test]
    fn prop_quantities_match_movements(
        openings in prop::collection::vec(0..20i32, PARTS),
        policy in policy_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..40)
    ) {
        tokio_test::block_on(run(openings, policy, ops))?;
    }
}
