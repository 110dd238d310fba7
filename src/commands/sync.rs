use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, Workspace};
use crate::error::Result;
use crate::lease::SyncLease;
use crate::mutation::LocalMutations;
use crate::remote::{GitHubProvider, RemoteProvider};
use crate::sync::{FailureClass, SyncEngine, SyncReport};

/// Replay every pending queue against the remote.
///
/// Entry failures end up in the report and do not make the command fail.
pub async fn cmd_sync(output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let config = workspace.load_config()?;
    let provider = GitHubProvider::from_config(&config)?;

    let _lease = SyncLease::acquire(&workspace.layout.lease_path())?;

    tracing::info!("syncing pending mutations to {}", provider.repository());
    let engine = SyncEngine::new(&provider, &workspace.queues, config.sync.to_options());
    let report = engine.run().await;

    CommandOutput::new(json!({
        "repository": provider.repository(),
        "report": report,
    }))
    .with_text(render_report(&report))
    .print(output_json)
}

/// Refresh the cache from the remote issue list.
///
/// Issues with unsynced edits keep them; the queues are left as they are.
pub async fn cmd_pull(output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let config = workspace.load_config()?;
    let provider = GitHubProvider::from_config(&config)?;

    let issues = provider.list_issues().await?;
    let count = LocalMutations::new(&workspace.cache, &workspace.queues).import_remote(issues)?;

    CommandOutput::new(json!({
        "action": "pull",
        "repository": provider.repository(),
        "imported": count,
    }))
    .with_text(format!(
        "Pulled {} issues from {}",
        count.to_string().green(),
        provider.repository().cyan()
    ))
    .print(output_json)
}

fn render_report(report: &SyncReport) -> String {
    if report.is_noop() {
        return "Nothing to sync.".dimmed().to_string();
    }

    let mut text = String::new();
    for queue in &report.queues {
        if queue.loaded == 0 && queue.load_error.is_none() {
            continue;
        }
        text.push_str(&format!(
            "{}: {} applied",
            queue.kind.to_string().cyan(),
            queue.applied.to_string().green()
        ));
        if queue.rate_limited > 0 {
            text.push_str(&format!(", {} rate limited", queue.rate_limited.to_string().yellow()));
        }
        if queue.failed > 0 {
            text.push_str(&format!(", {} failed", queue.failed.to_string().red()));
        }
        if queue.remaining > 0 {
            text.push_str(&format!(", {} remaining", queue.remaining));
        }
        if let Some(ref err) = queue.load_error {
            text.push_str(&format!(" ({} {err})", "could not load:".red()));
        }
        text.push('\n');
    }

    for failure in &report.failures {
        let label = match failure.class {
            FailureClass::RateLimited => "rate limited".yellow().to_string(),
            FailureClass::Remote => "failed".red().to_string(),
            FailureClass::Ack => "not removed".red().to_string(),
        };
        text.push_str(&format!(
            "  {label} {} #{}: {}\n",
            failure.key, failure.issue_id, failure.message
        ));
    }

    text.push_str(&format!(
        "{} applied, {} still pending",
        report.total_applied(),
        report.total_remaining()
    ));
    text
}
