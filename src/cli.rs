use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::{IssueState, VALID_STATES, parse_label_list};

#[derive(Parser)]
#[command(name = "hermes")]
#[command(about = "Local-first issue tracking with deferred remote sync")]
#[command(version)]
pub struct Cli {
    /// Log progress to stderr (overrides HERMES_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue a field update and apply it to the local cache
    #[command(visible_alias = "m")]
    Mutate {
        /// Issue number
        id: u64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New body
        #[arg(long)]
        body: Option<String>,

        /// New state (open, closed)
        #[arg(long, value_parser = parse_state)]
        state: Option<IssueState>,

        /// Replace all labels (comma-separated)
        #[arg(long)]
        labels: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Queue a comment on an issue
    Comment {
        /// Issue number
        id: u64,

        /// Comment text (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        body: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Queue a full replacement of an issue's labels
    Labels {
        /// Issue number
        id: u64,

        /// Labels (comma-separated, empty clears all labels)
        #[arg(default_value = "")]
        labels: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search cached issues by title or number
    #[command(visible_alias = "s")]
    Search {
        /// Case-insensitive text matched against title and issue number
        #[arg(default_value = "")]
        query: String,

        /// Comma-separated label terms; every term must match some label
        #[arg(long)]
        labels: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay pending mutations against the remote
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refresh the local cache from the remote
    Pull {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List queued mutations
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Seed the cache from a JSON array of issues
    Import {
        /// Path to the JSON file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show cache location and contents
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Key (e.g. remote.owner, auth.token, sync.batch_size)
        key: String,

        /// Value
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            MutateOptions, cmd_cache_import, cmd_cache_status, cmd_comment, cmd_config_set,
            cmd_config_show, cmd_labels, cmd_mutate, cmd_pending, cmd_pull, cmd_search, cmd_sync,
        };

        match self {
            Commands::Mutate {
                id,
                title,
                body,
                state,
                labels,
                json,
            } => cmd_mutate(
                id,
                MutateOptions {
                    title,
                    body,
                    state,
                    labels: labels.as_deref().map(parse_label_list),
                },
                json,
            ),
            Commands::Comment { id, body, json } => cmd_comment(id, &body.join(" "), json),
            Commands::Labels { id, labels, json } => {
                cmd_labels(id, parse_label_list(&labels), json)
            }
            Commands::Search {
                query,
                labels,
                json,
            } => cmd_search(&query, labels.as_deref(), json),
            Commands::Sync { json } => cmd_sync(json).await,
            Commands::Pull { json } => cmd_pull(json).await,
            Commands::Pending { json } => cmd_pending(json),
            Commands::Cache { action } => match action {
                CacheAction::Import { file, json } => cmd_cache_import(&file, json),
                CacheAction::Status { json } => cmd_cache_status(json),
            },
            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
            },
        }
    }
}

fn parse_state(s: &str) -> Result<IssueState, String> {
    s.parse()
        .map_err(|_| format!("Invalid state. Must be one of: {}", VALID_STATES.join(", ")))
}
