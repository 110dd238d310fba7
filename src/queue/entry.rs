use serde::{Deserialize, Serialize};

use crate::types::FieldChanges;

use super::{EntryKey, QueueEntry, QueueKind};

/// Outstanding field update for one issue. At most one exists per issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFieldUpdate {
    pub id: u64,
    #[serde(flatten)]
    pub changes: FieldChanges,
}

impl QueueEntry for PendingFieldUpdate {
    const KIND: QueueKind = QueueKind::FieldUpdates;

    fn key(&self) -> EntryKey {
        EntryKey::for_issue(self.id)
    }

    fn issue_id(&self) -> u64 {
        self.id
    }
}

/// Comment waiting to be created remotely. Never coalesced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingComment {
    pub issue_id: u64,
    pub body: String,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl PendingComment {
    pub fn new(issue_id: u64, body: impl Into<String>, created_at: jiff::Timestamp) -> Self {
        Self {
            issue_id,
            body: body.into(),
            created_at: created_at.to_string(),
        }
    }

    /// Creation time in milliseconds since the epoch, 0 if unparsable.
    pub fn created_millis(&self) -> i64 {
        self.created_at
            .parse::<jiff::Timestamp>()
            .map(|t| t.as_millisecond())
            .unwrap_or(0)
    }
}

impl QueueEntry for PendingComment {
    const KIND: QueueKind = QueueKind::Comments;

    fn key(&self) -> EntryKey {
        EntryKey::for_comment(self.issue_id, self.created_millis())
    }

    fn issue_id(&self) -> u64 {
        self.issue_id
    }
}

/// Full replacement label set for one issue. At most one exists per issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLabelSet {
    pub issue_id: u64,
    pub labels: Vec<String>,
}

impl QueueEntry for PendingLabelSet {
    const KIND: QueueKind = QueueKind::LabelSets;

    fn key(&self) -> EntryKey {
        EntryKey::for_issue(self.issue_id)
    }

    fn issue_id(&self) -> u64 {
        self.issue_id
    }
}
