pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod lease;
pub mod mutation;
pub mod paths;
pub mod query;
pub mod queue;
pub mod remote;
pub mod sync;
pub mod types;

pub use cache::CacheStore;
pub use config::Config;
pub use error::{HermesError, Result};
pub use mutation::LocalMutations;
pub use paths::Layout;
pub use query::search;
pub use queue::{
    EntryKey, PendingComment, PendingFieldUpdate, PendingLabelSet, PendingQueue, PendingQueues,
    QueueKind,
};
pub use remote::{GitHubProvider, RemoteProvider};
pub use sync::{RateLimitPolicy, SyncEngine, SyncOptions, SyncReport};
pub use types::{CachedIssue, FieldChanges, IssueState, IssueSummary};
