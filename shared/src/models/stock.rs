//! Stock movement models: stock-in receipts, stock-out ledger entries and
//! the outcomes reported by the stock-out ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency precision for stored prices and totals
pub const PRICE_SCALE: u32 = 2;

/// `amount` rounded and padded to exactly two decimal places, the form a
/// `NUMERIC(_, 2)` column hands back
pub fn to_currency(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp(PRICE_SCALE);
    amount.rescale(PRICE_SCALE);
    amount
}

/// Total price of a movement, rounded to currency precision
pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    to_currency(Decimal::from(quantity) * unit_price)
}

/// A stock-in receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockInRecord {
    pub id: Uuid,
    pub spare_part_id: Uuid,
    pub quantity: i32,
    pub stock_in_date: DateTime<Utc>,
}

/// Input for recording a stock-in
#[derive(Debug, Clone, Deserialize)]
pub struct NewStockIn {
    pub spare_part_id: Uuid,
    pub quantity: i32,
}

/// Result of recording a stock-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInReceipt {
    pub record: StockInRecord,
    /// Spare part balance after the receipt was applied
    pub quantity_after: i32,
}

/// A stock-out ledger entry. Identity and `stock_out_date` never change
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOutRecord {
    pub id: Uuid,
    pub spare_part_id: Uuid,
    pub quantity: i32,
    /// Price snapshot at the time of sale, independent of the catalog price
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub stock_out_date: DateTime<Utc>,
}

/// Requested stock-out values, used both to record and to revise an entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockOutInput {
    pub spare_part_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A signed quantity change applied to one spare part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityAdjustment {
    pub spare_part_id: Uuid,
    pub delta: i32,
    pub quantity_after: i32,
}

/// Outcome of revising a stock-out entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockOutRevision {
    pub record: StockOutRecord,
    /// Old quantity minus new quantity: positive when stock went back on the shelf
    pub stock_adjustment: i32,
    pub old_spare_part_id: Uuid,
    pub new_spare_part_id: Uuid,
    /// Adjustments in the order they were applied
    pub adjustments: Vec<QuantityAdjustment>,
}

impl StockOutRevision {
    pub fn moved_between_parts(&self) -> bool {
        self.old_spare_part_id != self.new_spare_part_id
    }
}

/// Outcome of revoking a stock-out entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOutRevocation {
    pub record_id: Uuid,
    pub spare_part_id: Uuid,
    pub restored_quantity: i32,
    pub quantity_after: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(5, dec("2.00")), dec("10.00"));
        assert_eq!(line_total(3, dec("19.99")), dec("59.97"));
        assert_eq!(line_total(7, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_rounds_to_currency_precision() {
        // Banker's rounding on the half cent
        assert_eq!(line_total(1, dec("0.125")), dec("0.12"));
        assert_eq!(line_total(3, dec("0.335")), dec("1.00"));
    }

    #[test]
    fn test_amounts_carry_two_decimal_places() {
        assert_eq!(line_total(1, dec("1")).to_string(), "1.00");
        assert_eq!(line_total(4, Decimal::ZERO).to_string(), "0.00");
        assert_eq!(line_total(2, dec("0.5")).to_string(), "1.00");
        assert_eq!(to_currency(dec("4.5000")).to_string(), "4.50");
        assert_eq!(to_currency(dec("12")).to_string(), "12.00");
    }

    #[test]
    fn test_revision_detects_part_move() {
        let record = StockOutRecord {
            id: Uuid::new_v4(),
            spare_part_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: dec("1.00"),
            total_price: dec("3.00"),
            stock_out_date: Utc::now(),
        };
        let old = Uuid::new_v4();
        let revision = StockOutRevision {
            record: record.clone(),
            stock_adjustment: 1,
            old_spare_part_id: old,
            new_spare_part_id: record.spare_part_id,
            adjustments: Vec::new(),
        };
        assert!(revision.moved_between_parts());
    }
}
