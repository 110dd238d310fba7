use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{Workspace, print_json};
use crate::error::Result;
use crate::query::search;

/// A row in the search results table
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Labels")]
    labels: String,
    #[tabled(rename = "Pending")]
    pending: String,
}

/// Search the local cache. Fails if the cache was never populated.
pub fn cmd_search(query: &str, labels: Option<&str>, output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let results = search(&workspace.cache, query, labels)?;

    if output_json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|issue| {
                json!({
                    "id": issue.id,
                    "title": issue.title,
                    "body": issue.body,
                    "state": issue.state.to_string(),
                    "labels": issue.labels,
                    "updated_at": issue.updated_at,
                })
            })
            .collect();
        return print_json(&json!(json_results));
    }

    if results.is_empty() {
        println!("No matching issues found.");
        return Ok(());
    }

    let pending = workspace.queues.pending_issue_ids()?;
    let rows: Vec<SearchResultRow> = results
        .iter()
        .map(|issue| SearchResultRow {
            id: issue.id,
            state: issue.state.to_string(),
            title: issue.title.clone(),
            labels: issue.labels.join(", "),
            pending: if pending.contains(&issue.id) { "yes" } else { "" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
