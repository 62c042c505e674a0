//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::services::auth::{AuthToken, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<AuthToken>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let token = auth_service.login(&body.username, &body.password).await?;

    tracing::info!(user_id = %token.user.id, "User logged in");
    Ok(Json(token))
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterInput>,
) -> Result<(StatusCode, Json<AuthToken>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let token = auth_service.register(body).await?;

    tracing::info!(user_id = %token.user.id, username = %token.user.username, "User registered");
    Ok((StatusCode::CREATED, Json(token)))
}
