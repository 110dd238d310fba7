use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, Workspace};
use crate::error::Result;
use crate::queue::{Pending, QueueKind};

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "Queue")]
    queue: String,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Issue")]
    issue: String,
    #[tabled(rename = "Change")]
    change: String,
}

/// Show every queued mutation, in the order `sync` would replay them.
pub fn cmd_pending(output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let queues = &workspace.queues;

    let updates = queues.updates.list_pending()?;
    let comments = queues.comments.list_pending()?;
    let labels = queues.labels.list_pending()?;

    let mut rows = Vec::new();
    for item in &updates {
        rows.push(PendingRow {
            queue: QueueKind::FieldUpdates.to_string(),
            entry: item.key.to_string(),
            issue: format!("#{}", item.entry.id),
            change: item.entry.changes.field_names().join(", "),
        });
    }
    for item in &comments {
        rows.push(PendingRow {
            queue: QueueKind::Comments.to_string(),
            entry: item.key.to_string(),
            issue: format!("#{}", item.entry.issue_id),
            change: preview(&item.entry.body, 40),
        });
    }
    for item in &labels {
        rows.push(PendingRow {
            queue: QueueKind::LabelSets.to_string(),
            entry: item.key.to_string(),
            issue: format!("#{}", item.entry.issue_id),
            change: item.entry.labels.join(", "),
        });
    }

    let json_output = json!({
        "field_updates": entries_json(&updates),
        "comments": entries_json(&comments),
        "label_sets": entries_json(&labels),
        "total": rows.len(),
    });

    let text = if rows.is_empty() {
        "No pending mutations.".dimmed().to_string()
    } else {
        let total = rows.len();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        format!("{table}\n{total} pending")
    };

    CommandOutput::new(json_output)
        .with_text(text)
        .print(output_json)
}

fn entries_json<E: Serialize>(pending: &[Pending<E>]) -> Vec<Value> {
    pending
        .iter()
        .map(|p| json!({ "key": p.key, "entry": p.entry }))
        .collect()
}

fn preview(body: &str, max_chars: usize) -> String {
    let first_line = body.lines().next().unwrap_or_default();
    if first_line.chars().count() > max_chars {
        let truncated: String = first_line.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}
