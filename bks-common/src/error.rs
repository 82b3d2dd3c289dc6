//! Common error types for the bookstore crates

use thiserror::Error;

/// Common result type for bookstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library and the web service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML bootstrap file could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Stored value could not be interpreted (e.g. a malformed setting)
    #[error("Invalid stored value for '{key}': {reason}")]
    InvalidStoredValue { key: String, reason: String },
}
