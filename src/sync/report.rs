use serde::Serialize;

use crate::queue::{EntryKey, QueueKind};

/// Outcome of draining one queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueReport {
    pub kind: QueueKind,
    pub loaded: usize,
    pub applied: usize,
    pub rate_limited: usize,
    pub failed: usize,
    /// Entries still queued after the drain
    pub remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl QueueReport {
    pub fn new(kind: QueueKind) -> Self {
        Self {
            kind,
            loaded: 0,
            applied: 0,
            rate_limited: 0,
            failed: 0,
            remaining: 0,
            load_error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Remote throttled us; entry left queued
    RateLimited,
    /// Any other remote failure; entry left queued
    Remote,
    /// Applied remotely but the entry file could not be removed
    Ack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub kind: QueueKind,
    pub key: EntryKey,
    pub issue_id: u64,
    pub class: FailureClass,
    pub message: String,
}

/// Summary of one sync run. Failures never abort the run; they end up here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub queues: Vec<QueueReport>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn queue(&self, kind: QueueKind) -> Option<&QueueReport> {
        self.queues.iter().find(|q| q.kind == kind)
    }

    pub fn total_applied(&self) -> usize {
        self.queues.iter().map(|q| q.applied).sum()
    }

    pub fn total_remaining(&self) -> usize {
        self.queues.iter().map(|q| q.remaining).sum()
    }

    /// True when every queue was empty at load time.
    pub fn is_noop(&self) -> bool {
        self.queues
            .iter()
            .all(|q| q.loaded == 0 && q.load_error.is_none())
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || self.queues.iter().any(|q| q.load_error.is_some())
    }
}
