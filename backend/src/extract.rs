//! Request extractors that reject with [`AppError`]
//!
//! axum's own `Json`, `Path` and `Query` answer malformed input with a
//! plain-text body. These wrappers route the rejection through `AppError` so a bad
//! request gets the same `VALIDATION_ERROR` body as any other invalid input.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
