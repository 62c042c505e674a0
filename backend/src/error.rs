//! Error handling for the spare-parts inventory server
//!
//! Every failure leaves the server as a JSON body of the form
//! `{"error": {"code", "message", "field"?}}`

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{ErrorKind, LedgerError};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // Stock ledger errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Status and body for a stock ledger failure
fn ledger_error_detail(err: &LedgerError) -> (StatusCode, ErrorDetail) {
    match err.kind() {
        ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            ErrorDetail::new("NOT_FOUND", err.to_string()),
        ),
        ErrorKind::InvalidInput => {
            let detail = ErrorDetail::new("VALIDATION_ERROR", err.to_string());
            let detail = match err.field() {
                Some(field) => detail.with_field(field),
                None => detail,
            };
            (StatusCode::BAD_REQUEST, detail)
        }
        ErrorKind::InvalidState => {
            let code = match err {
                LedgerError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
                _ => "NEGATIVE_STOCK",
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(code, err.to_string()),
            )
        }
        ErrorKind::Conflict => (
            StatusCode::CONFLICT,
            ErrorDetail::new(
                "CONFLICT",
                "The record is being modified by another request, please retry",
            ),
        ),
        ErrorKind::Unavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorDetail::new("STORE_UNAVAILABLE", "The inventory store is temporarily unavailable"),
        ),
        ErrorKind::Internal => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
        ),
    }
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid username or password"),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone()).with_field(field.clone()),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                )
                .with_field(field.clone()),
            ),
            AppError::Ledger(err) => ledger_error_detail(err),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!(status = status.as_u16(), "Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Name of the offending field in a serde error message, when it carries one
///
/// Covers serde's missing-field message and the `path: reason` prefix of a
/// typed deserialization error.
fn rejected_field(message: &str) -> Option<String> {
    if let Some(rest) = message.split("missing field `").nth(1) {
        return rest.split('`').next().map(str::to_string);
    }

    let detail = message.rsplit("target type: ").next().unwrap_or(message);
    let (path, _) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then(|| path.to_string())
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        let field = match rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&message),
            _ => None,
        };
        AppError::Validation {
            field: field.unwrap_or_else(|| "body".to_string()),
            message,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation("id", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("query", rejection.body_text())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: AppError) -> StatusCode {
        err.status_and_detail().0
    }

    #[test]
    fn test_ledger_kinds_map_to_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(
            status_of(LedgerError::spare_part_not_found(id).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LedgerError::invalid("quantity", "must be positive").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                LedgerError::InsufficientStock {
                    spare_part_id: id,
                    requested: 5,
                    on_hand: 1
                }
                .into()
            ),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(LedgerError::Conflict("lock timeout".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LedgerError::Unavailable("pool timed out".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(LedgerError::Internal("boom".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_input_errors_name_the_field() {
        let (_, detail) =
            AppError::from(LedgerError::invalid("unit_price", "too many decimals")).status_and_detail();
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("unit_price"));
    }

    #[test]
    fn test_rejected_field_from_missing_field() {
        let message = "Failed to deserialize the JSON body into the target type: \
                       missing field `quantity` at line 1 column 62";
        assert_eq!(rejected_field(message).as_deref(), Some("quantity"));
    }

    #[test]
    fn test_rejected_field_from_typed_error() {
        let message = "Failed to deserialize the JSON body into the target type: \
                       unit_price: invalid type: boolean `true`, expected a Decimal type \
                       at line 1 column 20";
        assert_eq!(rejected_field(message).as_deref(), Some("unit_price"));
    }

    #[test]
    fn test_rejected_field_without_path() {
        let message = "Failed to deserialize the JSON body into the target type: \
                       invalid type: sequence, expected struct StockOutInput at line 1 column 0";
        assert_eq!(rejected_field(message), None);
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let (_, detail) =
            AppError::from(LedgerError::Internal("relation stock_out does not exist".into()))
                .status_and_detail();
        assert!(!detail.message.contains("stock_out"));
    }
}
