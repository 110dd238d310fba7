//! Remote issue tracker boundary.
//!
//! The sync engine only sees [`RemoteProvider`]. Every failure a provider
//! returns must be classified as either [`HermesError::RateLimited`] (the
//! remote asked us to slow down) or some other error, which the engine treats
//! as a plain remote failure.

pub mod error;
pub mod github;

use std::future::Future;

use crate::error::Result;
use crate::types::{CachedIssue, FieldChanges};

pub use github::GitHubProvider;

/// Common interface for remote providers
pub trait RemoteProvider: Send + Sync {
    /// Apply only the fields present in `changes`.
    fn update_issue(
        &self,
        id: u64,
        changes: &FieldChanges,
    ) -> impl Future<Output = Result<()>> + Send;

    fn create_comment(&self, id: u64, body: &str) -> impl Future<Output = Result<()>> + Send;

    /// Replace the issue's labels with exactly `labels`.
    fn replace_labels(
        &self,
        id: u64,
        labels: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Every issue in the repository, for populating the cache.
    fn list_issues(&self) -> impl Future<Output = Result<Vec<CachedIssue>>> + Send;
}
