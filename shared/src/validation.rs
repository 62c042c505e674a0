//! Validation utilities for the spare-parts inventory system

use rust_decimal::Decimal;

use crate::models::{line_total, PRICE_SCALE};

/// Largest unit price a `NUMERIC(10,2)` column can hold
pub fn max_unit_price() -> Decimal {
    Decimal::new(9_999_999_999, PRICE_SCALE)
}

/// Largest total price a `NUMERIC(18,2)` column can hold
pub fn max_line_total() -> Decimal {
    Decimal::new(999_999_999_999_999_999, PRICE_SCALE)
}

// ============================================================================
// Stock Movement Validations
// ============================================================================

/// Validate a movement quantity (stock-in or stock-out)
pub fn validate_movement_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be a positive whole number");
    }
    Ok(())
}

/// Validate a unit price: non-negative, currency precision, fits the column
pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Unit price cannot be negative");
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err("Unit price must have at most two decimal places");
    }
    if price > max_unit_price() {
        return Err("Unit price is too large");
    }
    Ok(())
}

/// Validate that a stock-out total fits the stored column
pub fn validate_line_total(quantity: i32, unit_price: Decimal) -> Result<(), &'static str> {
    if line_total(quantity, unit_price) > max_line_total() {
        return Err("Quantity times unit price exceeds the largest storable total");
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate username format (3-20 ASCII letters or digits)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 || username.len() > 20 {
        return Err("Username must be 3-20 characters long");
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Username must contain only letters and numbers");
    }
    Ok(())
}

/// Validate that a registration password was entered and confirmed
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password is required");
    }
    if password != confirm {
        return Err("Passwords do not match");
    }
    Ok(())
}
