//! Catalog persistence for bks-web
//!
//! Schema creation lives in `bks_common::db`; this module holds the queries.

pub mod books;
