//! Shared types and models for the spare-parts inventory system
//!
//! Domain models, ledger outcome types and validation helpers used by the
//! backend and by any client that talks to it.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
