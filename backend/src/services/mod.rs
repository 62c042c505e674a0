//! Business logic services for the spare-parts inventory system

pub mod auth;
pub mod reporting;
pub mod spare_parts;
pub mod stock_in;
pub mod stock_out;

pub use auth::AuthService;
pub use reporting::ReportingService;
pub use spare_parts::SparePartService;
pub use stock_in::StockInService;
pub use stock_out::StockOutService;
