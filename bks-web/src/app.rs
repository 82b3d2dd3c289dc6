//! Application lifecycle
//!
//! `Application` owns the database pool, the refresh service and the
//! scheduler task. Nothing here is process-global, so tests can run several
//! applications side by side.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::CatalogConfig;
use crate::services::{CatalogRefreshService, CatalogSource, RefreshReport};
use crate::{build_router, AppState};

pub struct Application {
    state: AppState,
    cancel: CancellationToken,
    scheduler: Option<JoinHandle<()>>,
}

impl Application {
    pub fn new(
        db: SqlitePool,
        source: Arc<dyn CatalogSource>,
        config: CatalogConfig,
        shared_secret: i64,
    ) -> Self {
        let refresh = Arc::new(CatalogRefreshService::new(db.clone(), source, config));

        Self {
            state: AppState::new(db, refresh, shared_secret),
            cancel: CancellationToken::new(),
            scheduler: None,
        }
    }

    /// Seed the catalog if empty, then start the refresh timer
    ///
    /// Calling `start` on a running application only reseeds.
    pub async fn start(&mut self) -> RefreshReport {
        let report = self.state.refresh.seed_if_empty().await;
        info!(outcome = ?report.outcome, "Startup catalog check finished");

        if self.scheduler.is_none() {
            let handle = Arc::clone(&self.state.refresh).spawn_scheduler(self.cancel.child_token());
            self.scheduler = Some(handle);
        }

        report
    }

    /// Stop the refresh timer and wait for it and any manual refresh to exit
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();

        if let Some(handle) = self.scheduler.take() {
            if let Err(e) = handle.await {
                warn!("Catalog refresh scheduler ended abnormally: {}", e);
            }
        }

        self.state.refresh.wait_for_manual_refresh().await;
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}
