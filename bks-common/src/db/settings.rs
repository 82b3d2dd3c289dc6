//! Key-value accessors for the `settings` table

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::fmt::Display;
use std::str::FromStr;

/// Timestamp (RFC 3339) of the last successful catalog replacement
pub const LAST_CATALOG_REFRESH_KEY: &str = "last_catalog_refresh";

/// Read and parse a setting; `None` when the key is absent or NULL
pub async fn get_setting<T>(db: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match row.and_then(|(value,)| value) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::InvalidStoredValue {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Insert or overwrite a setting
pub async fn set_setting<T: ToString>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn get_last_catalog_refresh(db: &SqlitePool) -> Result<Option<DateTime<Utc>>> {
    get_setting::<DateTime<Utc>>(db, LAST_CATALOG_REFRESH_KEY).await
}

pub async fn set_last_catalog_refresh(db: &SqlitePool, at: DateTime<Utc>) -> Result<()> {
    set_setting(db, LAST_CATALOG_REFRESH_KEY, at.to_rfc3339()).await
}
