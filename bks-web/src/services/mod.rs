//! Catalog ingestion pipeline
//!
//! `openlibrary_client` fetches raw search results, `book_normalizer` turns
//! them into rows, `catalog_builder` aggregates a store's worth of books and
//! `catalog_refresh` decides when the catalog is replaced.

pub mod book_fetcher;
pub mod book_normalizer;
pub mod catalog_builder;
pub mod catalog_refresh;
pub mod openlibrary_client;

pub use catalog_builder::build_store_catalog;
pub use catalog_refresh::{
    fallback_books, CatalogRefreshService, RefreshOutcome, RefreshReport, RefreshTrigger,
};
pub use openlibrary_client::{CatalogSource, OLError, OLWork, OpenLibraryClient};
