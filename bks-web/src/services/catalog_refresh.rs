//! Catalog refresh orchestration
//!
//! Seeds an empty catalog at startup and replaces it on a fixed timer.
//! Replacement is swap-on-success: the old rows are deleted in the same
//! transaction that inserts the new ones, and only when the aggregation
//! produced at least one book.
//!
//! Only one run may be active at a time. A run that finds another in progress
//! is skipped, not queued.

use bks_common::db::settings::set_last_catalog_refresh;
use bks_common::db::{NewBook, PLACEHOLDER_COVER_PATH};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::catalog_builder::{build_store_catalog, DEFAULT_BOOK_COUNT};
use super::openlibrary_client::CatalogSource;
use crate::config::CatalogConfig;
use crate::db::books::{count_books, insert_books, replace_catalog};

/// What started a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    Startup,
    Scheduled,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Empty catalog filled at startup
    Seeded { count: usize, fallback: bool },
    /// Catalog swapped for a fresh aggregation
    Replaced { count: usize },
    /// Nothing written; existing rows untouched
    Skipped { reason: String },
    /// Transaction rolled back
    Failed { error: String },
}

/// Result of a single run, kept for the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    pub trigger: RefreshTrigger,
    pub finished_at: DateTime<Utc>,
    pub outcome: RefreshOutcome,
}

impl RefreshReport {
    fn now(trigger: RefreshTrigger, outcome: RefreshOutcome) -> Self {
        Self {
            trigger,
            finished_at: Utc::now(),
            outcome,
        }
    }
}

/// Books inserted when the first aggregation at startup comes back empty
pub fn fallback_books() -> Vec<NewBook> {
    vec![
        NewBook {
            title: "The Great Gatsby".to_string(),
            author: "F. Scott Fitzgerald".to_string(),
            description: "A classic American novel set in the Jazz Age".to_string(),
            price: 12.99,
            isbn: "9780743273565".to_string(),
            cover_image: PLACEHOLDER_COVER_PATH.to_string(),
            stock: 15,
        },
        NewBook {
            title: "To Kill a Mockingbird".to_string(),
            author: "Harper Lee".to_string(),
            description: "A gripping tale of racial injustice and childhood innocence"
                .to_string(),
            price: 14.99,
            isbn: "9780061120084".to_string(),
            cover_image: PLACEHOLDER_COVER_PATH.to_string(),
            stock: 20,
        },
    ]
}

/// Holds the in-progress flag; clears it on drop
struct RefreshGuard {
    flag: Arc<AtomicBool>,
}

impl RefreshGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: Arc::clone(flag) })
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct CatalogRefreshService {
    db: SqlitePool,
    source: Arc<dyn CatalogSource>,
    config: CatalogConfig,
    in_progress: Arc<AtomicBool>,
    last_report: RwLock<Option<RefreshReport>>,
    /// Background task started by the most recent manual trigger
    manual_run: Mutex<Option<JoinHandle<()>>>,
}

impl CatalogRefreshService {
    pub fn new(db: SqlitePool, source: Arc<dyn CatalogSource>, config: CatalogConfig) -> Self {
        Self {
            db,
            source,
            config,
            in_progress: Arc::new(AtomicBool::new(false)),
            last_report: RwLock::new(None),
            manual_run: Mutex::new(None),
        }
    }

    pub fn config(&self) -> CatalogConfig {
        self.config
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub async fn last_report(&self) -> Option<RefreshReport> {
        self.last_report.read().await.clone()
    }

    /// Fill the catalog if it has no rows
    ///
    /// Always aggregates [`DEFAULT_BOOK_COUNT`] books, falling back to
    /// [`fallback_books`] when nothing could be fetched.
    pub async fn seed_if_empty(&self) -> RefreshReport {
        let Some(_guard) = RefreshGuard::acquire(&self.in_progress) else {
            return self.record(RefreshTrigger::Startup, Self::busy()).await;
        };
        let outcome = self.seed().await;
        self.record(RefreshTrigger::Startup, outcome).await
    }

    /// Run one refresh now, skipping if another run holds the guard
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshReport {
        let Some(_guard) = RefreshGuard::acquire(&self.in_progress) else {
            warn!(?trigger, "Catalog refresh already in progress, skipping");
            return self.record(trigger, Self::busy()).await;
        };
        let outcome = self.replace().await;
        self.record(trigger, outcome).await
    }

    /// Start a manual refresh in the background
    ///
    /// Returns `false` without spawning anything when a run is already active.
    pub fn trigger_refresh(self: &Arc<Self>) -> bool {
        let Some(guard) = RefreshGuard::acquire(&self.in_progress) else {
            return false;
        };

        let service = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = service.replace().await;
            service.record(RefreshTrigger::Manual, outcome).await;
            drop(guard);
        });

        *self
            .manual_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Wait for a manual refresh started by [`Self::trigger_refresh`] to finish
    pub async fn wait_for_manual_refresh(&self) {
        let handle = self
            .manual_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Manual catalog refresh ended abnormally: {}", e);
            }
        }
    }

    /// Spawn the periodic refresh loop
    ///
    /// The first tick fires one full interval from now. Ticks missed while a
    /// run is slow are skipped rather than bunched up.
    pub fn spawn_scheduler(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let period = self.config.refresh_interval();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                interval_minutes = self.config.refresh_interval_minutes,
                books_count = self.config.books_count,
                "Catalog refresh scheduler started"
            );

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.refresh(RefreshTrigger::Scheduled).await;
                    }
                }
            }

            info!("Catalog refresh scheduler stopped");
        })
    }

    async fn seed(&self) -> RefreshOutcome {
        match count_books(&self.db).await {
            Ok(0) => {}
            Ok(existing) => {
                info!(existing, "Catalog already populated, skipping seed");
                return RefreshOutcome::Skipped {
                    reason: "catalog already populated".to_string(),
                };
            }
            Err(e) => return Self::failed("count catalog", e),
        }

        let mut rng = StdRng::from_entropy();
        let mut books =
            build_store_catalog(self.source.as_ref(), DEFAULT_BOOK_COUNT, &mut rng).await;

        let fallback = books.is_empty();
        if fallback {
            warn!("No books fetched at startup, inserting fallback catalog");
            books = fallback_books();
        }

        match insert_books(&self.db, &books).await {
            Ok(count) => {
                self.mark_refreshed().await;
                info!(count, fallback, "Catalog seeded");
                RefreshOutcome::Seeded { count, fallback }
            }
            Err(e) => Self::failed("seed catalog", e),
        }
    }

    async fn replace(&self) -> RefreshOutcome {
        let mut rng = StdRng::from_entropy();
        let books =
            build_store_catalog(self.source.as_ref(), self.config.books_count, &mut rng).await;

        if books.is_empty() {
            warn!("No books fetched, keeping existing catalog");
            return RefreshOutcome::Skipped {
                reason: "no books fetched".to_string(),
            };
        }

        match replace_catalog(&self.db, &books).await {
            Ok(count) => {
                self.mark_refreshed().await;
                info!(count, "Catalog replaced");
                RefreshOutcome::Replaced { count }
            }
            Err(e) => Self::failed("replace catalog", e),
        }
    }

    async fn mark_refreshed(&self) {
        if let Err(e) = set_last_catalog_refresh(&self.db, Utc::now()).await {
            warn!("Failed to record catalog refresh time: {}", e);
        }
    }

    fn busy() -> RefreshOutcome {
        RefreshOutcome::Skipped {
            reason: "refresh already in progress".to_string(),
        }
    }

    fn failed(action: &str, e: bks_common::Error) -> RefreshOutcome {
        error!("Failed to {}, rolled back: {}", action, e);
        RefreshOutcome::Failed {
            error: e.to_string(),
        }
    }

    async fn record(&self, trigger: RefreshTrigger, outcome: RefreshOutcome) -> RefreshReport {
        let report = RefreshReport::now(trigger, outcome);
        *self.last_report.write().await = Some(report.clone());
        report
    }
}
