//! Aggregation: fetch, normalize, dedup by ISBN, shuffle, take `count`

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::info;

use bks_common::db::NewBook;

use super::book_fetcher::{fetch_books_from_subjects, select_subjects, BOOKS_PER_SUBJECT};
use super::book_normalizer::normalize;
use super::openlibrary_client::{CatalogSource, OLWork};

/// Books fetched when the caller does not ask for a specific count
pub const DEFAULT_BOOK_COUNT: usize = 12;

/// Normalize, keep records with an ISBN, drop repeated ISBNs (first wins)
///
/// Output order follows `works`.
pub fn collect_unique_books<R: Rng + ?Sized>(works: &[OLWork], rng: &mut R) -> Vec<NewBook> {
    let mut seen_isbns = HashSet::new();

    works
        .iter()
        .filter_map(|work| normalize(work, rng))
        .filter_map(|book| book.into_new_book())
        .filter(|book| seen_isbns.insert(book.isbn.clone()))
        .collect()
}

/// Build a fresh set of at most `count` books from `source`
///
/// Returns an empty list when nothing could be fetched; callers must then
/// leave the existing catalog alone.
pub async fn build_store_catalog<S, R>(source: &S, count: usize, rng: &mut R) -> Vec<NewBook>
where
    S: CatalogSource + ?Sized,
    R: Rng + Send + ?Sized,
{
    let subjects = select_subjects(rng);
    info!(subjects = ?subjects, count, "Building store catalog");

    let works = fetch_books_from_subjects(source, &subjects, BOOKS_PER_SUBJECT).await;
    if works.is_empty() {
        return Vec::new();
    }

    let mut books = collect_unique_books(&works, rng);
    let unique = books.len();

    books.shuffle(rng);
    books.truncate(count);

    info!(fetched = works.len(), unique, selected = books.len(), "Store catalog built");
    books
}
