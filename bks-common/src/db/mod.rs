//! Database schema, models and key-value settings

pub mod init;
pub mod models;
pub mod settings;

pub use init::*;
pub use models::*;
