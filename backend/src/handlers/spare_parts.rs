//! Spare part catalog HTTP handlers

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use shared::models::{NewSparePart, SparePart};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::CurrentUser;
use crate::services::SparePartService;
use crate::AppState;

/// List all spare parts
pub async fn list_spare_parts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<SparePart>>> {
    let service = SparePartService::new(state.db, state.store);
    Ok(Json(service.list().await?))
}

/// Get a spare part
pub async fn get_spare_part(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<SparePart>> {
    let service = SparePartService::new(state.db, state.store);
    Ok(Json(service.get(id).await?))
}

/// Register a spare part
pub async fn create_spare_part(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<NewSparePart>,
) -> AppResult<(StatusCode, Json<SparePart>)> {
    let service = SparePartService::new(state.db, state.store);
    let part = service.register(input).await?;

    tracing::info!(
        spare_part_id = %part.id,
        user = %current_user.0.username,
        "Spare part registered"
    );
    Ok((StatusCode::CREATED, Json(part)))
}
