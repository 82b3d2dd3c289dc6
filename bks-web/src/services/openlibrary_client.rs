//! Open Library search API client
//!
//! One GET per subject against `search.json`, sorted by trending, with a
//! fixed field list. Each request is bounded by a 10 second timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use bks_common::db::PLACEHOLDER_COVER_PATH;

pub const OPENLIBRARY_BASE_URL: &str = "https://openlibrary.org";
const COVERS_BASE_URL: &str = "https://covers.openlibrary.org/b/id";
const USER_AGENT: &str = concat!("bks/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fields requested from the search endpoint
pub const SEARCH_FIELDS: &str =
    "key,title,author_name,cover_i,first_publish_year,isbn,number_of_pages_median,publisher";

/// Open Library client errors
#[derive(Debug, Error)]
pub enum OLError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One search result ("doc") as returned by Open Library
///
/// Every field is optional: the API omits fields it has no data for.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OLWork {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    /// Numeric cover identifier
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<Vec<String>>,
    #[serde(default)]
    pub number_of_pages_median: Option<u32>,
    #[serde(default)]
    pub publisher: Option<Vec<String>>,
}

/// Search response envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OLSearchResponse {
    #[serde(default)]
    pub docs: Vec<OLWork>,
}

/// Cover image sizes served by covers.openlibrary.org
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl fmt::Display for CoverSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        };
        f.write_str(code)
    }
}

/// Cover URL for `cover_id`, or the local placeholder when there is none
pub fn get_cover_url(cover_id: Option<i64>, size: CoverSize) -> String {
    match cover_id {
        Some(id) if id != 0 => format!("{}/{}-{}.jpg", COVERS_BASE_URL, id, size),
        _ => PLACEHOLDER_COVER_PATH.to_string(),
    }
}

/// Anything that can answer "trending works for a subject"
///
/// Production uses [`OpenLibraryClient`]; tests substitute an in-memory source.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn search_subject(&self, subject: &str, limit: usize) -> Result<Vec<OLWork>, OLError>;
}

/// Open Library HTTP client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new() -> Result<Self, OLError> {
        Self::with_base_url(OPENLIBRARY_BASE_URL)
    }

    /// Client against a different host (test servers, mirrors)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, OLError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| OLError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/search.json", self.base_url)
    }
}

#[async_trait]
impl CatalogSource for OpenLibraryClient {
    async fn search_subject(&self, subject: &str, limit: usize) -> Result<Vec<OLWork>, OLError> {
        let url = self.search_url();
        let limit = limit.to_string();

        tracing::debug!(subject = %subject, url = %url, "Querying Open Library search");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("subject", subject),
                ("sort", "trending"),
                ("limit", limit.as_str()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .await
            .map_err(|e| OLError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OLError::ApiError(status.as_u16(), error_text));
        }

        let body: OLSearchResponse = response
            .json()
            .await
            .map_err(|e| OLError::ParseError(e.to_string()))?;

        tracing::debug!(subject = %subject, results = body.docs.len(), "Open Library search returned");

        Ok(body.docs)
    }
}
