//! Durable outbox of local mutations awaiting remote confirmation.
//!
//! Each [`QueueKind`] owns one directory under the pending root, and each
//! entry is one JSON file named by its [`EntryKey`]. Field updates and label
//! sets are keyed by issue id, so re-enqueueing for the same issue replaces
//! the unsent entry (latest wins: the earlier edit is discarded, not merged).
//! Comments are keyed by issue id and creation time and are never replaced.
//!
//! An entry file exists exactly as long as its mutation is unconfirmed:
//! [`PendingQueue::ack`] is the only way an entry leaves the queue.

pub mod entry;

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{HermesError, Result};
use crate::fs::{delete_file, find_json_stems, read_file, write_file_atomic};

pub use entry::{PendingComment, PendingFieldUpdate, PendingLabelSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    FieldUpdates,
    Comments,
    LabelSets,
}

impl QueueKind {
    /// Drain order used by the sync engine.
    pub const ALL: [QueueKind; 3] = [
        QueueKind::FieldUpdates,
        QueueKind::Comments,
        QueueKind::LabelSets,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            QueueKind::FieldUpdates => "updates",
            QueueKind::Comments => "comments",
            QueueKind::LabelSets => "labels",
        }
    }

    /// Whether a new entry replaces an unsent entry with the same key.
    pub fn coalesces(&self) -> bool {
        !matches!(self, QueueKind::Comments)
    }

    /// Ordering key parsed from a file stem, `None` for foreign files.
    ///
    /// Issue-keyed queues sort by numeric issue id. Comments sort by creation
    /// time, then collision suffix, then issue id.
    fn order_key(&self, stem: &str) -> Option<(i64, u32, u64)> {
        if self.coalesces() {
            return stem.parse::<u64>().ok().map(|id| (0, 0, id));
        }

        let mut parts = stem.split('-');
        let id = parts.next()?.parse::<u64>().ok()?;
        let millis = parts.next()?.parse::<i64>().ok()?;
        let suffix = match parts.next() {
            Some(n) => n.parse::<u32>().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some((millis, suffix, id))
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::FieldUpdates => write!(f, "field updates"),
            QueueKind::Comments => write!(f, "comments"),
            QueueKind::LabelSets => write!(f, "label sets"),
        }
    }
}

/// Identity of a queue entry: the file stem of its entry file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryKey(String);

impl EntryKey {
    pub fn for_issue(id: u64) -> Self {
        EntryKey(id.to_string())
    }

    pub fn for_comment(issue_id: u64, created_millis: i64) -> Self {
        EntryKey(format!("{issue_id}-{created_millis}"))
    }

    fn with_suffix(&self, n: u32) -> Self {
        EntryKey(format!("{}-{n}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A serializable mutation that lives in one of the pending queues.
pub trait QueueEntry: Serialize + DeserializeOwned {
    const KIND: QueueKind;

    /// Base identity. Coalescing kinds use it verbatim.
    fn key(&self) -> EntryKey;

    /// Issue the mutation targets.
    fn issue_id(&self) -> u64;
}

/// An entry read back from disk together with its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending<E> {
    pub key: EntryKey,
    pub entry: E,
}

/// File-backed queue for one mutation kind.
#[derive(Debug, Clone)]
pub struct PendingQueue<E> {
    dir: PathBuf,
    _entry: PhantomData<fn() -> E>,
}

impl<E: QueueEntry> PendingQueue<E> {
    pub fn open(pending_root: &Path) -> Self {
        Self {
            dir: pending_root.join(E::KIND.dir_name()),
            _entry: PhantomData,
        }
    }

    pub fn kind(&self) -> QueueKind {
        E::KIND
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &EntryKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    /// Durably write `entry`, returning the key it was stored under.
    pub fn enqueue(&self, entry: &E) -> Result<EntryKey> {
        let base = entry.key();
        let mut key = base.clone();

        if E::KIND.coalesces() {
            let path = self.path_for(&key);
            if path.is_file() {
                let previous = read_file(&path).unwrap_or_default();
                tracing::debug!(
                    "replacing unsent {} entry {key} (discarded: {})",
                    E::KIND,
                    previous.trim()
                );
            }
        } else {
            let mut n = 0;
            while self.path_for(&key).exists() {
                n += 1;
                key = base.with_suffix(n);
            }
        }

        let content = serde_json::to_string_pretty(entry)?;
        write_file_atomic(&self.path_for(&key), &content)?;
        tracing::debug!("queued {} entry {key}", E::KIND);
        Ok(key)
    }

    /// Every readable entry, in processing order.
    ///
    /// Files that fail to read or parse are logged and skipped, never removed.
    pub fn list_pending(&self) -> Result<Vec<Pending<E>>> {
        let mut keyed = Vec::new();
        for stem in self.stems()? {
            match E::KIND.order_key(&stem) {
                Some(order) => keyed.push((order, stem)),
                None => tracing::warn!(
                    "ignoring unrecognized file '{stem}.json' in {}",
                    self.dir.display()
                ),
            }
        }
        keyed.sort();

        let mut pending = Vec::with_capacity(keyed.len());
        for (_, stem) in keyed {
            let key = EntryKey(stem);
            let path = self.path_for(&key);
            let parsed = read_file(&path)
                .and_then(|content| serde_json::from_str::<E>(&content).map_err(Into::into));
            match parsed {
                Ok(entry) => pending.push(Pending { key, entry }),
                Err(e) => tracing::warn!("skipping unreadable {} entry {key}: {e}", E::KIND),
            }
        }
        Ok(pending)
    }

    /// Irrevocably remove an entry after the remote confirmed it.
    pub fn ack(&self, key: &EntryKey) -> Result<()> {
        delete_file(&self.path_for(key))
    }

    /// Number of entry files, without parsing them.
    pub fn len(&self) -> Result<usize> {
        Ok(self
            .stems()?
            .iter()
            .filter(|s| E::KIND.order_key(s).is_some())
            .count())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn stems(&self) -> Result<Vec<String>> {
        find_json_stems(&self.dir).map_err(|e| HermesError::Durability {
            operation: "list",
            path: self.dir.clone(),
            source: e,
        })
    }
}

/// The three queues under one pending root.
#[derive(Debug, Clone)]
pub struct PendingQueues {
    pub updates: PendingQueue<PendingFieldUpdate>,
    pub comments: PendingQueue<PendingComment>,
    pub labels: PendingQueue<PendingLabelSet>,
}

impl PendingQueues {
    pub fn open(pending_root: &Path) -> Self {
        Self {
            updates: PendingQueue::open(pending_root),
            comments: PendingQueue::open(pending_root),
            labels: PendingQueue::open(pending_root),
        }
    }

    pub fn len_of(&self, kind: QueueKind) -> Result<usize> {
        match kind {
            QueueKind::FieldUpdates => self.updates.len(),
            QueueKind::Comments => self.comments.len(),
            QueueKind::LabelSets => self.labels.len(),
        }
    }

    /// Ids of every issue with at least one queued mutation.
    pub fn pending_issue_ids(&self) -> Result<BTreeSet<u64>> {
        let mut ids = BTreeSet::new();
        ids.extend(self.updates.list_pending()?.iter().map(|p| p.entry.issue_id()));
        ids.extend(self.comments.list_pending()?.iter().map(|p| p.entry.issue_id()));
        ids.extend(self.labels.list_pending()?.iter().map(|p| p.entry.issue_id()));
        Ok(ids)
    }

    /// Whether any queued mutation targets `issue_id`.
    pub fn has_pending_for(&self, issue_id: u64) -> Result<bool> {
        Ok(self.pending_issue_ids()?.contains(&issue_id))
    }
}
