//! Domain models for the spare-parts inventory system

mod spare_part;
mod stock;
mod user;

pub use spare_part::*;
pub use stock::*;
pub use user::*;
