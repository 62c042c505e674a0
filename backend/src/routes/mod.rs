//! Route definitions for the spare-parts inventory API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .nest("/spare-parts", spare_part_routes(state.clone()))
        .nest("/stock-in", stock_in_routes(state.clone()))
        .nest("/stock-out", stock_out_routes(state.clone()))
        .nest("/reports", report_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// Spare part catalog routes (protected)
fn spare_part_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_spare_parts).post(handlers::create_spare_part),
        )
        .route("/:id", get(handlers::get_spare_part))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock-in routes (protected)
fn stock_in_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_stock_in).post(handlers::record_stock_in),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock-out ledger routes (protected)
fn stock_out_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_stock_out).post(handlers::record_stock_out),
        )
        .route(
            "/:id",
            get(handlers::get_stock_out)
                .put(handlers::revise_stock_out)
                .delete(handlers::revoke_stock_out),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Report routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/daily-stock-out", get(handlers::daily_stock_out))
        .route("/stock-status", get(handlers::stock_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
