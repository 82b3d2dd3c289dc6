//! HTTP API handlers for bks-web

pub mod auth;
pub mod books;
pub mod catalog;
pub mod health;
pub mod static_assets;

pub use auth::auth_middleware;
pub use books::{get_book, list_books};
pub use catalog::{catalog_status, trigger_refresh};
pub use health::health_routes;
pub use static_assets::serve_placeholder_cover;
