//! Offline search over the cache index.
//!
//! Filters run against index summaries only; detail files are loaded for the
//! survivors afterwards.

use crate::cache::CacheStore;
use crate::error::Result;
use crate::types::{CachedIssue, IssueSummary};

/// Trait for issue filters
pub trait IssueFilter {
    fn matches(&self, issue: &IssueSummary) -> bool;
}

/// Case-insensitive title substring, or substring of the decimal id.
///
/// The empty query matches every issue.
pub struct TextFilter {
    needle: String,
}

impl TextFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }
}

impl IssueFilter for TextFilter {
    fn matches(&self, issue: &IssueSummary) -> bool {
        issue.title.to_lowercase().contains(&self.needle)
            || issue.id.to_string().contains(&self.needle)
    }
}

/// Permissive label filter: every term must be a substring of at least one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    terms: Vec<String>,
}

impl LabelFilter {
    /// Parse a comma-separated list into trimmed, lower-cased terms.
    pub fn parse(list: &str) -> Self {
        Self {
            terms: list
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl IssueFilter for LabelFilter {
    fn matches(&self, issue: &IssueSummary) -> bool {
        let labels: Vec<String> = issue.labels.iter().map(|l| l.to_lowercase()).collect();
        self.terms
            .iter()
            .all(|term| labels.iter().any(|label| label.contains(term.as_str())))
    }
}

/// Search the cache without contacting the remote.
///
/// Fails with `CacheMissing` when the cache has never been populated.
pub fn search(
    cache: &CacheStore,
    query: &str,
    label_filter: Option<&str>,
) -> Result<Vec<CachedIssue>> {
    let mut filters: Vec<Box<dyn IssueFilter>> = vec![Box::new(TextFilter::new(query))];
    if let Some(list) = label_filter {
        filters.push(Box::new(LabelFilter::parse(list)));
    }

    let mut results = Vec::new();
    for summary in cache.list_all()? {
        if !filters.iter().all(|f| f.matches(&summary)) {
            continue;
        }
        match cache.try_get(summary.id) {
            Ok(Some(issue)) => results.push(issue),
            Ok(None) => results.push(summary.into()),
            Err(e) => {
                tracing::warn!("falling back to index summary for #{}: {e}", summary.id);
                results.push(summary.into());
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HermesError;
    use crate::types::IssueState;
    use tempfile::TempDir;

    fn issue(id: u64, title: &str, labels: &[&str]) -> CachedIssue {
        CachedIssue {
            id,
            title: title.to_string(),
            body: format!("details for {id}"),
            state: IssueState::Open,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            updated_at: "2024-02-02T00:00:00Z".to_string(),
        }
    }

    fn populated() -> (TempDir, CacheStore) {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::open(dir.path());
        cache
            .import(&[
                issue(3, "Inventory duplicates items", &["bug-report", "priority:p1"]),
                issue(42, "Matchmaking timeout", &["bug-report"]),
                issue(108, "Add photo mode", &["feature", "P2"]),
            ])
            .unwrap();
        (dir, cache)
    }

    fn ids(results: &[CachedIssue]) -> Vec<u64> {
        results.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let (_dir, cache) = populated();
        assert_eq!(ids(&search(&cache, "", None).unwrap()), vec![3, 42, 108]);
    }

    #[test]
    fn test_query_matches_id_substring() {
        let (_dir, cache) = populated();
        assert_eq!(ids(&search(&cache, "42", None).unwrap()), vec![42]);
        // "10" is a substring of 108 only.
        assert_eq!(ids(&search(&cache, "10", None).unwrap()), vec![108]);
    }

    #[test]
    fn test_query_matches_title_case_insensitive() {
        let (_dir, cache) = populated();
        assert_eq!(ids(&search(&cache, "MATCHMAKING", None).unwrap()), vec![42]);
    }

    #[test]
    fn test_label_filter_requires_every_term() {
        let (_dir, cache) = populated();
        assert_eq!(ids(&search(&cache, "", Some("bug,p1")).unwrap()), vec![3]);
        assert_eq!(ids(&search(&cache, "", Some("bug")).unwrap()), vec![3, 42]);
    }

    #[test]
    fn test_label_filter_is_normalized() {
        let (_dir, cache) = populated();
        assert_eq!(ids(&search(&cache, "", Some(" p2 , ")).unwrap()), vec![108]);
        assert_eq!(
            LabelFilter::parse(" Bug, ,P1 ").terms(),
            &["bug".to_string(), "p1".to_string()]
        );
    }

    #[test]
    fn test_empty_label_filter_keeps_everything() {
        let (_dir, cache) = populated();
        assert_eq!(search(&cache, "", Some("")).unwrap().len(), 3);
    }

    #[test]
    fn test_results_carry_detail() {
        let (_dir, cache) = populated();
        let results = search(&cache, "photo", None).unwrap();
        assert_eq!(results[0].body, "details for 108");
    }

    #[test]
    fn test_falls_back_to_summary_without_detail_file() {
        let (dir, cache) = populated();
        std::fs::remove_file(dir.path().join("issues").join("42.json")).unwrap();

        let results = search(&cache, "42", None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Matchmaking timeout");
        assert!(results[0].body.is_empty());
    }

    #[test]
    fn test_unpopulated_cache_is_not_found() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::open(dir.path());
        assert!(matches!(
            search(&cache, "", None),
            Err(HermesError::CacheMissing(_))
        ));
    }
}
