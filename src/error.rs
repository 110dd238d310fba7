use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HermesError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("issue #{0} not found in cache")]
    IssueNotFound(u64),

    #[error("issue cache has not been populated (no index at {})", .0.display())]
    CacheMissing(PathBuf),

    // Remote sync errors. The seconds are a hint for display only.
    #[error("rate limited by remote, retry after {0}s")]
    RateLimited(u64),

    #[error("API error: {0}")]
    Api(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("failed to {operation} {}: {source}", path.display())]
    Durability {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("another sync run holds the lease at {} (pid {pid})", path.display())]
    LeaseHeld { path: PathBuf, pid: u32 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HermesError {
    /// Whether this error came from the remote throttling us.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, HermesError::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, HermesError>;
