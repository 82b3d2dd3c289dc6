//! Normalizer: raw Open Library work → storage-ready book
//!
//! Price and stock are generated by [`PlaceholderCommerce`]. Open Library has
//! no commercial data, so these values are demo data, not inventory.

use rand::Rng;

use bks_common::db::{NewBook, UNKNOWN_AUTHOR};

use super::openlibrary_client::{get_cover_url, CoverSize, OLWork};

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 100;

/// Description used when a work has no publication facts
pub const GENERIC_DESCRIPTION: &str = "A great book from Open Library's collection.";

/// Publishers named in a description
const MAX_PUBLISHERS: usize = 2;

/// Normalized record
///
/// `isbn` stays optional here; aggregation drops records without one.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub isbn: Option<String>,
    pub cover_image: String,
    pub stock: i64,
}

impl NormalizedBook {
    /// Storage-ready form, `None` when there is no ISBN
    pub fn into_new_book(self) -> Option<NewBook> {
        let isbn = self.isbn?;
        Some(NewBook {
            title: self.title,
            author: self.author,
            description: self.description,
            price: self.price,
            isbn,
            cover_image: self.cover_image,
            stock: self.stock,
        })
    }
}

/// Placeholder price and stock generator
pub struct PlaceholderCommerce;

impl PlaceholderCommerce {
    pub const PRICE_MIN: f64 = 9.99;
    pub const PRICE_MAX: f64 = 24.99;
    pub const STOCK_MIN: i64 = 5;
    pub const STOCK_MAX: i64 = 30;

    /// Uniform price in [9.99, 24.99], rounded to cents
    pub fn price<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        let raw = rng.gen_range(Self::PRICE_MIN..=Self::PRICE_MAX);
        (raw * 100.0).round() / 100.0
    }

    /// Uniform stock level in [5, 30]
    pub fn stock<R: Rng + ?Sized>(rng: &mut R) -> i64 {
        rng.gen_range(Self::STOCK_MIN..=Self::STOCK_MAX)
    }
}

/// First character-count-13 entry, else first 10, else first entry
pub fn select_isbn(isbns: &[String]) -> Option<String> {
    let by_len = |len: usize| isbns.iter().find(|isbn| isbn.chars().count() == len);

    by_len(13)
        .or_else(|| by_len(10))
        .or_else(|| isbns.first())
        .cloned()
}

/// Sentences built from first publish year, publishers and median page count
pub fn build_description(work: &OLWork) -> String {
    let mut parts = Vec::new();

    if let Some(year) = work.first_publish_year.filter(|&y| y != 0) {
        parts.push(format!("First published in {}.", year));
    }

    if let Some(publishers) = work.publisher.as_ref().filter(|p| !p.is_empty()) {
        let named: Vec<&str> = publishers
            .iter()
            .take(MAX_PUBLISHERS)
            .map(String::as_str)
            .collect();
        parts.push(format!("Published by {}.", named.join(", ")));
    }

    if let Some(pages) = work.number_of_pages_median.filter(|&p| p != 0) {
        parts.push(format!("Approximately {} pages.", pages));
    }

    if parts.is_empty() {
        GENERIC_DESCRIPTION.to_string()
    } else {
        parts.join(" ")
    }
}

/// Truncate to at most `max` characters (not bytes)
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Normalize one work; `None` when it has no title or no authors
pub fn normalize<R: Rng + ?Sized>(work: &OLWork, rng: &mut R) -> Option<NormalizedBook> {
    let title = work.title.as_deref().filter(|t| !t.is_empty())?;
    let authors = work.author_name.as_ref().filter(|a| !a.is_empty())?;

    let author = authors
        .first()
        .map(String::as_str)
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(UNKNOWN_AUTHOR);

    let isbn = work.isbn.as_deref().and_then(select_isbn);

    Some(NormalizedBook {
        title: truncate_chars(title, TITLE_MAX_CHARS),
        author: truncate_chars(author, AUTHOR_MAX_CHARS),
        description: build_description(work),
        price: PlaceholderCommerce::price(rng),
        isbn,
        cover_image: get_cover_url(work.cover_i, CoverSize::Medium),
        stock: PlaceholderCommerce::stock(rng),
    })
}
