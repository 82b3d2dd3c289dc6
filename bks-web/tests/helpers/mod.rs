//! Shared fixtures for bks-web integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bks_web::services::{CatalogSource, OLError, OLWork};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Single-connection in-memory database with the schema applied
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    bks_common::db::create_tables(&pool)
        .await
        .expect("Should create tables");
    pool
}

pub fn work(title: &str, isbn: &str) -> OLWork {
    OLWork {
        key: Some(format!("/works/{}", isbn)),
        title: Some(title.to_string()),
        author_name: Some(vec!["Test Author".to_string()]),
        cover_i: Some(1000),
        first_publish_year: Some(1990),
        isbn: Some(vec![isbn.to_string()]),
        ..Default::default()
    }
}

/// `n` works with distinct 13-digit ISBNs
pub fn works(n: usize) -> Vec<OLWork> {
    (0..n)
        .map(|i| work(&format!("Book {}", i), &format!("978{:010}", i)))
        .collect()
}

/// Answers every subject with the same works
pub struct StaticSource {
    works: Vec<OLWork>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(works: Vec<OLWork>) -> Self {
        Self {
            works,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn search_subject(&self, _subject: &str, limit: usize) -> Result<Vec<OLWork>, OLError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.works.iter().take(limit).cloned().collect())
    }
}

/// Fails every request, like an unreachable host
pub struct DeadSource;

#[async_trait]
impl CatalogSource for DeadSource {
    async fn search_subject(&self, _subject: &str, _limit: usize) -> Result<Vec<OLWork>, OLError> {
        Err(OLError::NetworkError("connection refused".to_string()))
    }
}

/// Blocks every request until `release` is called
pub struct GatedSource {
    gate: Semaphore,
    works: Vec<OLWork>,
}

impl GatedSource {
    pub fn new(works: Vec<OLWork>) -> Self {
        Self {
            gate: Semaphore::new(0),
            works,
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl CatalogSource for GatedSource {
    async fn search_subject(&self, _subject: &str, _limit: usize) -> Result<Vec<OLWork>, OLError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| OLError::NetworkError(e.to_string()))?;
        Ok(self.works.clone())
    }
}
