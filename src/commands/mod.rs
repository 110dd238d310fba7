mod cache;
mod config;
mod mutate;
mod pending;
mod search;
mod sync;

pub use cache::{cmd_cache_import, cmd_cache_status};
pub use config::{cmd_config_set, cmd_config_show};
pub use mutate::{MutateOptions, cmd_comment, cmd_labels, cmd_mutate};
pub use pending::cmd_pending;
pub use search::cmd_search;
pub use sync::{cmd_pull, cmd_sync};

use serde_json::Value;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::Result;
use crate::paths::Layout;
use crate::queue::PendingQueues;

/// Print a JSON value to stdout.
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Command result rendered either as JSON or as human-readable text.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output_json: bool) -> Result<()> {
        if output_json {
            return print_json(&self.json);
        }
        match self.text {
            Some(text) => println!("{text}"),
            None => print_json(&self.json)?,
        }
        Ok(())
    }
}

/// Stores every command works against, resolved from one layout.
pub struct Workspace {
    pub layout: Layout,
    pub cache: CacheStore,
    pub queues: PendingQueues,
}

impl Workspace {
    pub fn open(layout: Layout) -> Self {
        let cache = CacheStore::open(layout.cache_dir());
        let queues = PendingQueues::open(&layout.pending_dir());
        Self {
            layout,
            cache,
            queues,
        }
    }

    pub fn from_env() -> Self {
        Self::open(Layout::from_env())
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.layout.config_path())
    }
}
