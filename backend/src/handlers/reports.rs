//! Report HTTP handlers

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DailyStockOutReport, StockStatusReport};
use crate::services::ReportingService;
use crate::AppState;

/// `?date=YYYY-MM-DD`, today (UTC) when absent
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub date: Option<NaiveDate>,
}

impl ReportQuery {
    fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

pub async fn daily_stock_out(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    AppQuery(query): AppQuery<ReportQuery>,
) -> AppResult<Json<DailyStockOutReport>> {
    let service = ReportingService::new(state.db);
    Ok(Json(service.daily_stock_out(query.date()).await?))
}

pub async fn stock_status(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    AppQuery(query): AppQuery<ReportQuery>,
) -> AppResult<Json<StockStatusReport>> {
    let service = ReportingService::new(state.db);
    Ok(Json(service.stock_status(query.date()).await?))
}
