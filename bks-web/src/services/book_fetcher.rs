//! Fetcher: trending works across a random sample of subjects
//!
//! A failing subject never aborts the fetch; it contributes no results.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::openlibrary_client::{CatalogSource, OLWork};

/// Subjects the store samples from
pub const SUBJECTS: [&str; 8] = [
    "fiction",
    "science_fiction",
    "mystery",
    "romance",
    "fantasy",
    "history",
    "biography",
    "science",
];

/// Subjects queried per fetch
pub const MAX_SUBJECTS: usize = 4;

/// Search results requested per subject
pub const BOOKS_PER_SUBJECT: usize = 30;

/// Pick up to [`MAX_SUBJECTS`] distinct subjects in random order
pub fn select_subjects<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static str> {
    SUBJECTS
        .choose_multiple(rng, MAX_SUBJECTS.min(SUBJECTS.len()))
        .copied()
        .collect()
}

/// Query each subject in turn and concatenate the results
///
/// Order is subject order, then per-subject result order.
pub async fn fetch_books_from_subjects<S>(
    source: &S,
    subjects: &[&str],
    books_per_subject: usize,
) -> Vec<OLWork>
where
    S: CatalogSource + ?Sized,
{
    let mut all_works = Vec::new();

    for subject in subjects {
        match source.search_subject(subject, books_per_subject).await {
            Ok(works) => {
                debug!(subject = %subject, count = works.len(), "Fetched subject");
                all_works.extend(works);
            }
            Err(e) => {
                warn!(subject = %subject, error = %e, "Error fetching books from Open Library");
            }
        }
    }

    all_works
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::openlibrary_client::OLError;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct ScriptedSource {
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl CatalogSource for ScriptedSource {
        async fn search_subject(&self, subject: &str, limit: usize) -> Result<Vec<OLWork>, OLError> {
            self.calls.lock().unwrap().push((subject.to_string(), limit));
            if subject == "broken" {
                return Err(OLError::NetworkError("connection reset".to_string()));
            }
            Ok((0..2)
                .map(|i| OLWork {
                    title: Some(format!("{}-{}", subject, i)),
                    ..Default::default()
                })
                .collect())
        }
    }

    fn titles(works: &[OLWork]) -> Vec<String> {
        works.iter().filter_map(|w| w.title.clone()).collect()
    }

    #[test]
    fn test_select_subjects_distinct_and_known() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let subjects = select_subjects(&mut rng);
            assert_eq!(subjects.len(), MAX_SUBJECTS);

            let unique: HashSet<_> = subjects.iter().collect();
            assert_eq!(unique.len(), subjects.len());
            assert!(subjects.iter().all(|s| SUBJECTS.contains(s)));
        }
    }

    #[tokio::test]
    async fn test_results_concatenated_in_subject_order() {
        let source = ScriptedSource { calls: Mutex::new(Vec::new()) };

        let works = fetch_books_from_subjects(&source, &["mystery", "history"], 30).await;

        assert_eq!(
            titles(&works),
            vec!["mystery-0", "mystery-1", "history-0", "history-1"]
        );
        let calls = source.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![("mystery".to_string(), 30), ("history".to_string(), 30)]
        );
    }

    #[tokio::test]
    async fn test_failed_subject_contributes_nothing() {
        let source = ScriptedSource { calls: Mutex::new(Vec::new()) };

        let works = fetch_books_from_subjects(&source, &["broken", "fantasy"], 30).await;

        assert_eq!(titles(&works), vec!["fantasy-0", "fantasy-1"]);
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_all_subjects_failing_yields_empty() {
        let source = ScriptedSource { calls: Mutex::new(Vec::new()) };
        let works = fetch_books_from_subjects(&source, &["broken", "broken"], 30).await;
        assert!(works.is_empty());
    }
}
