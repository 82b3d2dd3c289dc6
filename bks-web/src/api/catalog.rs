//! Catalog refresh status and manual trigger

use axum::{extract::State, http::StatusCode, Json};
use bks_common::db::settings::get_last_catalog_refresh;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::services::RefreshReport;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogStatusResponse {
    pub refresh_in_progress: bool,
    pub refresh_interval_minutes: u64,
    pub books_count: usize,
    /// Last successful seed or replacement
    pub last_refresh: Option<DateTime<Utc>>,
    /// Most recent run of any outcome since startup
    pub last_report: Option<RefreshReport>,
}

/// GET /api/catalog/status
pub async fn catalog_status(
    State(state): State<AppState>,
) -> ApiResult<Json<CatalogStatusResponse>> {
    let config = state.refresh.config();

    Ok(Json(CatalogStatusResponse {
        refresh_in_progress: state.refresh.is_refreshing(),
        refresh_interval_minutes: config.refresh_interval_minutes,
        books_count: config.books_count,
        last_refresh: get_last_catalog_refresh(&state.db).await?,
        last_report: state.refresh.last_report().await,
    }))
}

/// POST /api/catalog/refresh
///
/// Starts a refresh in the background and returns immediately.
pub async fn trigger_refresh(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if !state.refresh.trigger_refresh() {
        return Err(ApiError::Conflict(
            "Catalog refresh already in progress".to_string(),
        ));
    }

    info!("Manual catalog refresh started");
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "started" }))))
}
