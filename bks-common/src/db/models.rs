//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Cover image used when Open Library has no cover for a work
pub const PLACEHOLDER_COVER_PATH: &str = "/static/images/book-placeholder.svg";

/// Author recorded when the source provides none
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Persisted catalog row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub guid: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub isbn: String,
    pub cover_image: String,
    pub stock: i64,
    pub created_at: NaiveDateTime,
}

/// Storage-ready book, not yet assigned a guid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub isbn: String,
    pub cover_image: String,
    pub stock: i64,
}
