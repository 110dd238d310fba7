//! Offline mutations: queue the change, then mirror it into the cache.
//!
//! Nothing here touches the network. The cache write is speculative; the
//! pending entry left in the queue is what marks it as unconfirmed.

use crate::cache::CacheStore;
use crate::error::{HermesError, Result};
use crate::queue::{EntryKey, PendingComment, PendingFieldUpdate, PendingLabelSet, PendingQueues};
use crate::types::{CachedIssue, FieldChanges, now_timestamp};

pub struct LocalMutations<'a> {
    cache: &'a CacheStore,
    queues: &'a PendingQueues,
}

impl<'a> LocalMutations<'a> {
    pub fn new(cache: &'a CacheStore, queues: &'a PendingQueues) -> Self {
        Self { cache, queues }
    }

    /// Queue a partial field update and apply it to the cached issue, if any.
    ///
    /// Replaces any unsent field update for the same issue.
    pub fn queue_field_update(&self, id: u64, changes: FieldChanges) -> Result<EntryKey> {
        validate_id(id)?;
        let changes = normalize_changes(changes)?;
        if changes.is_empty() {
            return Err(HermesError::InvalidArgument(
                "at least one of title, body, state or labels is required".to_string(),
            ));
        }

        let key = self.queues.updates.enqueue(&PendingFieldUpdate {
            id,
            changes: changes.clone(),
        })?;

        if let Some(mut issue) = self.cache.try_get(id)? {
            issue.apply(&changes);
            issue.updated_at = now_timestamp();
            self.cache.upsert(&issue)?;
        } else {
            tracing::debug!("issue #{id} is not cached, queued update only");
        }

        Ok(key)
    }

    /// Queue a new comment. Comments are not cached.
    pub fn queue_comment(&self, id: u64, body: &str) -> Result<EntryKey> {
        validate_id(id)?;
        if body.trim().is_empty() {
            return Err(HermesError::InvalidArgument(
                "comment body cannot be empty".to_string(),
            ));
        }

        self.queues
            .comments
            .enqueue(&PendingComment::new(id, body, jiff::Timestamp::now()))
    }

    /// Queue a full label replacement and mirror it into the cache.
    ///
    /// An empty set is valid and clears every label.
    pub fn queue_label_set(&self, id: u64, labels: Vec<String>) -> Result<EntryKey> {
        validate_id(id)?;
        let labels = normalize_labels(labels);

        let key = self.queues.labels.enqueue(&PendingLabelSet {
            issue_id: id,
            labels: labels.clone(),
        })?;

        if let Some(mut issue) = self.cache.try_get(id)? {
            issue.labels = labels;
            issue.updated_at = now_timestamp();
            self.cache.upsert(&issue)?;
        }

        Ok(key)
    }

    /// Import a remote snapshot without losing unsynced local edits.
    ///
    /// Pending field updates and label sets are replayed onto the incoming
    /// issues, in queue order, before they are written to the cache.
    pub fn import_remote(&self, mut issues: Vec<CachedIssue>) -> Result<usize> {
        let updates = self.queues.updates.list_pending()?;
        let label_sets = self.queues.labels.list_pending()?;

        let mut overlaid = 0;
        for issue in &mut issues {
            let mut touched = false;
            let issue_id = issue.id;
            for pending in updates.iter().filter(|p| p.entry.id == issue_id) {
                issue.apply(&pending.entry.changes);
                touched = true;
            }
            for pending in label_sets.iter().filter(|p| p.entry.issue_id == issue.id) {
                issue.labels = pending.entry.labels.clone();
                touched = true;
            }
            if touched {
                overlaid += 1;
            }
        }
        if overlaid > 0 {
            tracing::debug!("kept pending edits on {overlaid} imported issues");
        }

        self.cache.import(&issues)
    }
}

fn validate_id(id: u64) -> Result<()> {
    if id == 0 {
        return Err(HermesError::InvalidArgument(
            "issue id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn normalize_changes(mut changes: FieldChanges) -> Result<FieldChanges> {
    if let Some(title) = &changes.title {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(HermesError::InvalidArgument(
                "title cannot be empty".to_string(),
            ));
        }
        changes.title = Some(trimmed.to_string());
    }
    changes.labels = changes.labels.map(normalize_labels);
    Ok(changes)
}

fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
