//! On-disk mirror of remote issues.
//!
//! The cache root holds an `index.json` with one [`IssueSummary`] per issue
//! and an `issues/` directory with one `<id>.json` detail file per issue.
//! Detail files are written before the index so that an index entry always
//! has a detail file behind it once the write returns.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{HermesError, Result};
use crate::fs::{read_file, write_file_atomic};
use crate::types::{CachedIssue, IssueSummary};

const INDEX_FILE: &str = "index.json";
const ISSUES_DIR: &str = "issues";

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn detail_path(&self, id: u64) -> PathBuf {
        self.root.join(ISSUES_DIR).join(format!("{id}.json"))
    }

    /// Whether the importer has ever written an index.
    pub fn is_populated(&self) -> bool {
        self.index_path().is_file()
    }

    /// Load one issue's detail file.
    pub fn get(&self, id: u64) -> Result<CachedIssue> {
        self.try_get(id)?.ok_or(HermesError::IssueNotFound(id))
    }

    /// Like [`CacheStore::get`], mapping a missing detail file to `None`.
    pub fn try_get(&self, id: u64) -> Result<Option<CachedIssue>> {
        let path = self.detail_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        let content = read_file(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Summaries of every cached issue, ascending by id.
    pub fn list_all(&self) -> Result<Vec<IssueSummary>> {
        let path = self.index_path();
        if !path.is_file() {
            return Err(HermesError::CacheMissing(path));
        }
        let content = read_file(&path)?;
        let mut summaries: Vec<IssueSummary> = serde_json::from_str(&content)?;
        summaries.sort_by_key(|s| s.id);
        Ok(summaries)
    }

    /// Write one issue's detail file and replace its index entry.
    pub fn upsert(&self, issue: &CachedIssue) -> Result<()> {
        self.write_detail(issue)?;

        let mut index = self.load_index_map()?;
        index.insert(issue.id, issue.summary());
        self.write_index(index)
    }

    /// Bulk upsert used by the importer. The index is rewritten once.
    pub fn import(&self, issues: &[CachedIssue]) -> Result<usize> {
        for issue in issues {
            self.write_detail(issue)?;
        }

        let mut index = self.load_index_map()?;
        for issue in issues {
            index.insert(issue.id, issue.summary());
        }
        self.write_index(index)?;

        tracing::debug!("imported {} issues into {}", issues.len(), self.root.display());
        Ok(issues.len())
    }

    fn write_detail(&self, issue: &CachedIssue) -> Result<()> {
        let content = serde_json::to_string_pretty(issue)?;
        write_file_atomic(&self.detail_path(issue.id), &content)
    }

    fn load_index_map(&self) -> Result<BTreeMap<u64, IssueSummary>> {
        let path = self.index_path();
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        let content = read_file(&path)?;
        let summaries: Vec<IssueSummary> = serde_json::from_str(&content)?;
        Ok(summaries.into_iter().map(|s| (s.id, s)).collect())
    }

    fn write_index(&self, index: BTreeMap<u64, IssueSummary>) -> Result<()> {
        let summaries: Vec<IssueSummary> = index.into_values().collect();
        let content = serde_json::to_string_pretty(&summaries)?;
        write_file_atomic(&self.index_path(), &content)
    }
}
