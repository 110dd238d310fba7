//! Configuration commands.
//!
//! - `config set`: Set a configuration value
//! - `config show`: Display current configuration

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, Workspace};
use crate::config::{Config, SyncSettings};
use crate::error::Result;

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

fn sync_settings_json(sync: &SyncSettings) -> serde_json::Value {
    json!({
        "batch_size": sync.batch_size,
        "entry_pause_ms": sync.entry_pause_ms,
        "batch_pause_ms": sync.batch_pause_ms,
        "rate_limit_cooldown_secs": sync.rate_limit_cooldown_secs,
        "rate_limit_policy": sync.rate_limit_policy,
        "rate_limit_retries": sync.rate_limit_retries,
    })
}

/// Show current configuration
pub fn cmd_config_show(output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let config = workspace.load_config()?;
    let config_path = workspace.layout.config_path();

    let token_configured = config.token().is_some();
    let file_token = config.auth.token.as_deref().map(mask_sensitive_value);

    let json_output = json!({
        "remote": config.remote.as_ref().map(|r| json!({ "owner": r.owner, "repo": r.repo })),
        "auth": {
            "token_configured": token_configured,
            "file_token": file_token,
        },
        "sync": sync_settings_json(&config.sync),
        "config_file": config_path.to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    match config.remote {
        Some(ref remote) => {
            text_output.push_str(&format!("{}:\n", "remote".cyan()));
            text_output.push_str(&format!("  owner: {}\n", remote.owner));
            text_output.push_str(&format!("  repo: {}\n", remote.repo));
        }
        None => text_output.push_str(&format!(
            "{}: {}\n",
            "remote".cyan(),
            "not configured".dimmed()
        )),
    }

    text_output.push('\n');
    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    let token_status = match (&file_token, token_configured) {
        (Some(masked), _) => masked.clone(),
        (None, true) => "from environment".green().to_string(),
        (None, false) => "not configured".dimmed().to_string(),
    };
    text_output.push_str(&format!("  token: {token_status}\n"));

    text_output.push('\n');
    let sync = &config.sync;
    text_output.push_str(&format!("{}:\n", "sync".cyan()));
    text_output.push_str(&format!("  batch_size: {}\n", sync.batch_size));
    text_output.push_str(&format!("  entry_pause_ms: {}\n", sync.entry_pause_ms));
    text_output.push_str(&format!("  batch_pause_ms: {}\n", sync.batch_pause_ms));
    text_output.push_str(&format!(
        "  rate_limit_cooldown_secs: {}\n",
        sync.rate_limit_cooldown_secs
    ));
    text_output.push_str(&format!(
        "  rate_limit_policy: {}\n",
        sync.rate_limit_policy
    ));
    text_output.push_str(&format!(
        "  rate_limit_retries: {}\n",
        sync.rate_limit_retries
    ));

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", config_path.display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output_json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output_json: bool) -> Result<()> {
    let workspace = Workspace::from_env();
    let config_path = workspace.layout.config_path();

    let mut config = Config::load(&config_path)?;
    config.set(key, value)?;
    config.save(&config_path)?;

    let shown = if key == "auth.token" {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} to {shown}", key.cyan()))
    .print(output_json)
}
