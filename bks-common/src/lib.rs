//! # Bookstore Common Library
//!
//! Shared code for the bookstore service:
//! - Error type and result alias
//! - Bootstrap configuration (root folder, TOML file, defaults)
//! - Database schema and models (`books`, `settings`)
//! - Signed-request validation for administrative API calls

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
