//! bks-web library: bookstore catalog service
//!
//! Serves a catalog of books pulled from Open Library and keeps it fresh
//! with a background refresh loop.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

pub use app::Application;
pub use config::CatalogConfig;
pub use error::{ApiError, ApiResult};

use services::CatalogRefreshService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub refresh: Arc<CatalogRefreshService>,
    /// 0 disables authentication on administrative routes
    pub shared_secret: i64,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, refresh: Arc<CatalogRefreshService>, shared_secret: i64) -> Self {
        Self {
            db,
            refresh,
            shared_secret,
            startup_time: Utc::now(),
        }
    }
}

/// Build the HTTP router
///
/// Only the refresh trigger requires a signed request.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/catalog/refresh", post(api::trigger_refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/books", get(api::list_books))
        .route("/api/books/:guid", get(api::get_book))
        .route("/api/catalog/status", get(api::catalog_status))
        .route(
            "/static/images/book-placeholder.svg",
            get(api::serve_placeholder_cover),
        )
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
