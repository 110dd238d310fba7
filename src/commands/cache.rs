use std::fs;
use std::path::Path;

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, Workspace};
use crate::error::{HermesError, Result};
use crate::mutation::LocalMutations;
use crate::types::CachedIssue;

/// Seed the cache from a JSON array of issues, keeping unsynced local edits.
pub fn cmd_cache_import(file: &Path, output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();

    let content = fs::read_to_string(file).map_err(|e| {
        HermesError::InvalidArgument(format!("cannot read '{}': {e}", file.display()))
    })?;
    let issues: Vec<CachedIssue> = serde_json::from_str(&content)?;
    if let Some(bad) = issues.iter().find(|issue| issue.id == 0) {
        return Err(HermesError::InvalidArgument(format!(
            "issue ids must be positive (found '{}')",
            bad.title
        )));
    }

    let count = LocalMutations::new(&workspace.cache, &workspace.queues).import_remote(issues)?;

    CommandOutput::new(json!({
        "action": "cache_import",
        "imported": count,
        "cache_dir": workspace.cache.root().to_string_lossy(),
    }))
    .with_text(format!("Imported {} issues into the cache", count.to_string().green()))
    .print(output_json)
}

pub fn cmd_cache_status(output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let cache = &workspace.cache;

    if !cache.is_populated() {
        return CommandOutput::new(json!({
            "cache_dir": cache.root().to_string_lossy(),
            "populated": false,
            "issue_count": 0,
        }))
        .with_text(format!(
            "Cache not populated at {}\nRun 'hermes pull' or 'hermes cache import <file>' to seed it.",
            cache.root().display()
        ))
        .print(output_json);
    }

    let summaries = cache.list_all()?;
    let open = summaries
        .iter()
        .filter(|s| s.state == crate::types::IssueState::Open)
        .count();
    let last_modified = fs::metadata(cache.index_path())
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| jiff::Timestamp::try_from(modified).ok())
        .map(|ts| ts.to_string());

    let mut text = String::new();
    text.push_str("Cache status:\n");
    text.push_str(&format!("  Cache dir: {}\n", cache.root().display()));
    text.push_str(&format!("  Cached issues: {}\n", summaries.len()));
    text.push_str(&format!("  Open: {open}"));
    if let Some(ref ts) = last_modified {
        text.push_str(&format!("\n  Index modified: {ts}"));
    }

    CommandOutput::new(json!({
        "cache_dir": cache.root().to_string_lossy(),
        "populated": true,
        "issue_count": summaries.len(),
        "open_count": open,
        "index_modified": last_modified,
    }))
    .with_text(text)
    .print(output_json)
}
