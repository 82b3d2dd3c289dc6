//! `books` table queries
//!
//! Catalog writes always happen inside one transaction: either every row of
//! a run lands or none does.

use bks_common::db::{Book, NewBook};
use bks_common::{Error, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::error;
use uuid::Uuid;

pub async fn count_books(db: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// One page of the catalog in insertion order
pub async fn list_books(db: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(
        r#"
        SELECT guid, title, author, description, price, isbn, cover_image, stock, created_at
        FROM books
        ORDER BY rowid ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(books)
}

pub async fn get_book(db: &SqlitePool, guid: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        SELECT guid, title, author, description, price, isbn, cover_image, stock, created_at
        FROM books
        WHERE guid = ?
        "#,
    )
    .bind(guid)
    .fetch_optional(db)
    .await?;

    Ok(book)
}

async fn insert_all(tx: &mut Transaction<'_, Sqlite>, books: &[NewBook]) -> Result<()> {
    for book in books {
        sqlx::query(
            r#"
            INSERT INTO books (guid, title, author, description, price, isbn, cover_image, stock)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.price)
        .bind(&book.isbn)
        .bind(&book.cover_image)
        .bind(book.stock)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn delete_then_insert(tx: &mut Transaction<'_, Sqlite>, books: &[NewBook]) -> Result<()> {
    sqlx::query("DELETE FROM books").execute(&mut **tx).await?;
    insert_all(tx, books).await
}

/// Roll `tx` back after `e`, returning `e` even if the rollback itself fails
async fn abort(tx: Transaction<'_, Sqlite>, action: &str, e: Error) -> Error {
    error!("{} failed, rolling back: {}", action, e);
    if let Err(rollback_err) = tx.rollback().await {
        error!("Rollback after failed {} also failed: {}", action, rollback_err);
    }
    e
}

/// Add books to the catalog, keeping existing rows
pub async fn insert_books(db: &SqlitePool, books: &[NewBook]) -> Result<usize> {
    let mut tx = db.begin().await?;

    if let Err(e) = insert_all(&mut tx, books).await {
        return Err(abort(tx, "inserting books", e).await);
    }

    tx.commit().await?;
    Ok(books.len())
}

/// Swap the whole catalog for `books`
///
/// The delete and the inserts share one transaction, so a failure at any
/// point leaves the previous catalog untouched.
pub async fn replace_catalog(db: &SqlitePool, books: &[NewBook]) -> Result<usize> {
    let mut tx = db.begin().await?;

    if let Err(e) = delete_then_insert(&mut tx, books).await {
        return Err(abort(tx, "replacing catalog", e).await);
    }

    tx.commit().await?;
    Ok(books.len())
}
