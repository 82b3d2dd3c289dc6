//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to date.
//! All `CREATE` statements are idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the database at `db_path` and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL lets API readers proceed while a refresh transaction is open
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create every table the service uses
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_books_table(pool).await?;
    Ok(())
}

/// Key-value application settings
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// The catalog. ISBN is unique because one ingestion run never yields duplicates.
pub async fn create_books_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (length(title) <= 200),
            author TEXT NOT NULL CHECK (length(author) <= 100),
            description TEXT NOT NULL,
            price REAL NOT NULL,
            isbn TEXT NOT NULL UNIQUE,
            cover_image TEXT NOT NULL,
            stock INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let pool = memory_pool().await;
        create_tables(&pool).await.unwrap();
        create_tables(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["books", "settings"]);
    }

    #[tokio::test]
    async fn test_books_isbn_is_unique() {
        let pool = memory_pool().await;
        create_tables(&pool).await.unwrap();

        let insert = "INSERT INTO books (guid, title, author, description, price, isbn, cover_image, stock) \
                      VALUES (?, 'T', 'A', 'D', 10.0, '9780441013593', '/c.jpg', 5)";
        sqlx::query(insert).bind("g1").execute(&pool).await.unwrap();
        let second = sqlx::query(insert).bind("g2").execute(&pool).await;

        assert!(second.is_err(), "Duplicate ISBN should violate UNIQUE");
    }
}
