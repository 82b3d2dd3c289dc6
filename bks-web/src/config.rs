//! Catalog settings resolution for bks-web
//!
//! **Priority:** CLI/ENV (via clap) → TOML `[catalog]` → compiled default.
//! Zero or out-of-range values are rejected rather than silently replaced.

use bks_common::config::{CompiledDefaults, TomlConfig};
use bks_common::{Error, Result};
use std::time::Duration;

/// Longest accepted refresh interval (one year)
pub const MAX_REFRESH_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Settings for the ingestion pipeline and its scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Minutes between scheduled refreshes
    pub refresh_interval_minutes: u64,
    /// Books kept per scheduled refresh
    pub books_count: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            refresh_interval_minutes: defaults.refresh_interval_minutes,
            books_count: defaults.books_count,
        }
    }
}

impl CatalogConfig {
    pub fn resolve(
        cli_interval_minutes: Option<u64>,
        cli_books_count: Option<usize>,
        toml: &TomlConfig,
    ) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            refresh_interval_minutes: cli_interval_minutes
                .or(toml.catalog.refresh_interval_minutes)
                .unwrap_or(defaults.refresh_interval_minutes),
            books_count: cli_books_count
                .or(toml.catalog.books_count)
                .unwrap_or(defaults.books_count),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_minutes == 0 {
            return Err(Error::Config(
                "refresh_interval_minutes must be at least 1".to_string(),
            ));
        }
        if self.refresh_interval_minutes > MAX_REFRESH_INTERVAL_MINUTES {
            return Err(Error::Config(format!(
                "refresh_interval_minutes must be at most {}",
                MAX_REFRESH_INTERVAL_MINUTES
            )));
        }
        if self.books_count == 0 {
            return Err(Error::Config("books_count must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Interval between scheduled runs, capped at [`MAX_REFRESH_INTERVAL_MINUTES`]
    pub fn refresh_interval(&self) -> Duration {
        let minutes = self
            .refresh_interval_minutes
            .min(MAX_REFRESH_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }
}
