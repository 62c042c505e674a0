//! Health check handlers

use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Health check endpoint handler; 503 when the database does not answer
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ping = tokio::time::timeout(
        DB_PROBE_TIMEOUT,
        sqlx::query("SELECT 1").execute(&state.db),
    )
    .await;

    let (status, database) = match ping {
        Ok(Ok(_)) => (StatusCode::OK, "connected"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "disconnected"),
    };

    (
        status,
        Json(HealthResponse {
            status: if status == StatusCode::OK { "healthy" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}
