//! Spare part catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A catalog item with a tracked on-hand quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePart {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// Running balance owned jointly by stock-in and stock-out movements
    pub quantity: i32,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a spare part
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSparePart {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_spare_part_field_rules() {
        let valid = NewSparePart {
            name: "Oil filter".to_string(),
            category: "Engine".to_string(),
            quantity: 0,
            unit_price: Decimal::new(899, 2),
        };
        assert!(valid.validate().is_ok());

        let blank_name = NewSparePart {
            name: String::new(),
            ..valid.clone()
        };
        assert!(blank_name.validate().is_err());

        let long_category = NewSparePart {
            category: "x".repeat(51),
            ..valid.clone()
        };
        assert!(long_category.validate().is_err());

        let negative = NewSparePart {
            quantity: -1,
            ..valid
        };
        assert!(negative.validate().is_err());
    }
}
