//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::services::RefreshOutcome;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Always "bks-web"
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Error from the most recent catalog refresh, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let last_error = match state.refresh.last_report().await {
        Some(report) => match report.outcome {
            RefreshOutcome::Failed { error } => Some(error),
            _ => None,
        },
        None => None,
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "bks-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        last_error,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
