//! Stock-out ledger HTTP handlers

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use shared::models::{StockOutInput, StockOutRecord, StockOutRevision, StockOutRevocation};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::ledger::StockLedger;
use crate::middleware::CurrentUser;
use crate::services::stock_out::StockOutEntry;
use crate::services::StockOutService;
use crate::AppState;

fn ledger(state: &AppState) -> StockLedger {
    StockLedger::new(state.store.clone(), state.config.ledger_policy())
}

/// List stock-out entries with their spare parts
pub async fn list_stock_out(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockOutEntry>>> {
    let service = StockOutService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn get_stock_out(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<StockOutRecord>> {
    Ok(Json(ledger(&state).stock_out(id).await?))
}

/// Record a sale
pub async fn record_stock_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<StockOutInput>,
) -> AppResult<(StatusCode, Json<StockOutRecord>)> {
    let record = ledger(&state).record_stock_out(&input).await?;

    tracing::info!(
        stock_out_id = %record.id,
        spare_part_id = %record.spare_part_id,
        quantity = record.quantity,
        user = %current_user.0.username,
        "Stock-out recorded"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Revise a recorded sale
pub async fn revise_stock_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<StockOutInput>,
) -> AppResult<Json<StockOutRevision>> {
    let revision = ledger(&state).revise_stock_out(id, &input).await?;

    tracing::info!(
        stock_out_id = %id,
        old_spare_part_id = %revision.old_spare_part_id,
        new_spare_part_id = %revision.new_spare_part_id,
        stock_adjustment = revision.stock_adjustment,
        moved = revision.moved_between_parts(),
        user = %current_user.0.username,
        "Stock-out revised"
    );
    Ok(Json(revision))
}

/// Revoke a recorded sale, returning its quantity to stock
pub async fn revoke_stock_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<StockOutRevocation>> {
    let revocation = ledger(&state).revoke_stock_out(id).await?;

    tracing::info!(
        stock_out_id = %id,
        spare_part_id = %revocation.spare_part_id,
        restored_quantity = revocation.restored_quantity,
        user = %current_user.0.username,
        "Stock-out revoked"
    );
    Ok(Json(revocation))
}
