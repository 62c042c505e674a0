//! Spare-parts inventory server
//!
//! Keeps the on-hand quantity of every spare part in step with the stock-in
//! receipts and the stock-out ledger.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use store::LedgerStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Pool for list and report queries
    pub db: sqlx::PgPool,
    /// Transactional store behind every stock movement
    pub store: Arc<dyn LedgerStore>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Spare Parts Inventory API v1"
}
