use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, Workspace};
use crate::error::Result;
use crate::mutation::LocalMutations;
use crate::types::{FieldChanges, IssueState};

/// Fields accepted by `hermes mutate`
#[derive(Debug, Default)]
pub struct MutateOptions {
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<IssueState>,
    pub labels: Option<Vec<String>>,
}

impl From<MutateOptions> for FieldChanges {
    fn from(options: MutateOptions) -> Self {
        FieldChanges {
            title: options.title,
            body: options.body,
            state: options.state,
            labels: options.labels,
        }
    }
}

pub fn cmd_mutate(id: u64, options: MutateOptions, output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let changes: FieldChanges = options.into();
    let fields = changes.field_names();

    let key = LocalMutations::new(&workspace.cache, &workspace.queues)
        .queue_field_update(id, changes)?;

    let text = format!(
        "Queued update for {} ({})",
        format!("#{id}").cyan(),
        fields.join(", ")
    );
    CommandOutput::new(json!({
        "id": id,
        "action": "update_queued",
        "entry": key,
        "fields": fields,
    }))
    .with_text(text)
    .print(output_json)
}

pub fn cmd_comment(id: u64, body: &str, output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();

    let key = LocalMutations::new(&workspace.cache, &workspace.queues).queue_comment(id, body)?;

    let text = format!("Queued comment on {}", format!("#{id}").cyan());
    CommandOutput::new(json!({
        "id": id,
        "action": "comment_queued",
        "entry": key,
    }))
    .with_text(text)
    .print(output_json)
}

pub fn cmd_labels(id: u64, labels: Vec<String>, output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();

    let key = LocalMutations::new(&workspace.cache, &workspace.queues)
        .queue_label_set(id, labels.clone())?;

    let shown = if labels.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        labels.join(", ")
    };
    let text = format!("Queued labels for {}: {shown}", format!("#{id}").cyan());
    CommandOutput::new(json!({
        "id": id,
        "action": "labels_queued",
        "entry": key,
        "labels": labels,
    }))
    .with_text(text)
    .print(output_json)
}
