//! HTTP handlers

pub mod auth;
pub mod health;
pub mod reports;
pub mod spare_parts;
pub mod stock_in;
pub mod stock_out;

pub use auth::{login, register};
pub use health::health_check;
pub use reports::{daily_stock_out, stock_status};
pub use spare_parts::{create_spare_part, get_spare_part, list_spare_parts};
pub use stock_in::{list_stock_in, record_stock_in};
pub use stock_out::{
    get_stock_out, list_stock_out, record_stock_out, revise_stock_out, revoke_stock_out,
};
