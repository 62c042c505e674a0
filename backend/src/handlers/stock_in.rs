//! Stock-in HTTP handlers

use axum::{extract::State, http::StatusCode, Json};

use shared::models::{NewStockIn, StockInReceipt};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::stock_in::StockInEntry;
use crate::services::StockInService;
use crate::AppState;

pub async fn list_stock_in(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockInEntry>>> {
    let service = StockInService::new(state.db, state.store);
    Ok(Json(service.list().await?))
}

/// Record received goods
pub async fn record_stock_in(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<NewStockIn>,
) -> AppResult<(StatusCode, Json<StockInReceipt>)> {
    let service = StockInService::new(state.db, state.store);
    let receipt = service.record(input).await?;

    tracing::info!(
        stock_in_id = %receipt.record.id,
        spare_part_id = %receipt.record.spare_part_id,
        quantity = receipt.record.quantity,
        quantity_after = receipt.quantity_after,
        user = %current_user.0.username,
        "Stock-in recorded"
    );
    Ok((StatusCode::CREATED, Json(receipt)))
}
