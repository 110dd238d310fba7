//! Replays the pending queues against the remote.
//!
//! Queues are drained one after another (field updates, comments, label
//! sets). Within a queue, entries go out one at a time in batches, with a
//! short pause after every applied entry and a longer one between batches.
//! An entry is acked only after the remote confirmed it; anything else
//! leaves it queued for the next run, so re-running is always safe.
//!
//! Callers must not run two engines over the same queues at once; the CLI
//! holds a [`crate::lease::SyncLease`] for the duration of a run.

pub mod report;

use std::time::Duration;

use tokio::time::sleep;

use crate::error::Result;
use crate::queue::{
    Pending, PendingComment, PendingFieldUpdate, PendingLabelSet, PendingQueue, PendingQueues,
    QueueEntry, QueueKind,
};
use crate::remote::RemoteProvider;

pub use report::{FailureClass, QueueReport, SyncFailure, SyncReport};

/// What to do with an entry the remote rate limited.
///
/// Either way the engine first sleeps for the cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitPolicy {
    /// Leave the entry queued and move on to the next one.
    SkipAfterCooldown,
    /// Retry the same entry up to `max_retries` times, then leave it queued.
    RetryAfterCooldown { max_retries: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub batch_size: usize,
    /// Pause after each applied entry
    pub entry_pause: Duration,
    /// Pause between batches (not after the last one)
    pub batch_pause: Duration,
    pub rate_limit_cooldown: Duration,
    pub rate_limit_policy: RateLimitPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            entry_pause: Duration::from_millis(500),
            batch_pause: Duration::from_secs(1),
            rate_limit_cooldown: Duration::from_secs(60),
            rate_limit_policy: RateLimitPolicy::SkipAfterCooldown,
        }
    }
}

/// How one queue entry is sent to the remote.
pub(crate) trait Replay: QueueEntry {
    async fn replay<P: RemoteProvider>(&self, provider: &P) -> Result<()>;
}

impl Replay for PendingFieldUpdate {
    async fn replay<P: RemoteProvider>(&self, provider: &P) -> Result<()> {
        provider.update_issue(self.id, &self.changes).await
    }
}

impl Replay for PendingComment {
    async fn replay<P: RemoteProvider>(&self, provider: &P) -> Result<()> {
        provider.create_comment(self.issue_id, &self.body).await
    }
}

impl Replay for PendingLabelSet {
    async fn replay<P: RemoteProvider>(&self, provider: &P) -> Result<()> {
        provider.replace_labels(self.issue_id, &self.labels).await
    }
}

enum Outcome {
    Applied,
    Failed(FailureClass, String),
}

pub struct SyncEngine<'a, P> {
    provider: &'a P,
    queues: &'a PendingQueues,
    options: SyncOptions,
}

impl<'a, P: RemoteProvider> SyncEngine<'a, P> {
    pub fn new(provider: &'a P, queues: &'a PendingQueues, options: SyncOptions) -> Self {
        Self {
            provider,
            queues,
            options,
        }
    }

    /// Drain every queue once. Never fails; problems are in the report.
    pub async fn run(&self) -> SyncReport {
        let mut report = SyncReport::default();
        for kind in QueueKind::ALL {
            let queue_report = match kind {
                QueueKind::FieldUpdates => self.drain(&self.queues.updates, &mut report).await,
                QueueKind::Comments => self.drain(&self.queues.comments, &mut report).await,
                QueueKind::LabelSets => self.drain(&self.queues.labels, &mut report).await,
            };
            report.queues.push(queue_report);
        }
        report
    }

    async fn drain<E: Replay>(
        &self,
        queue: &PendingQueue<E>,
        report: &mut SyncReport,
    ) -> QueueReport {
        let mut queue_report = QueueReport::new(E::KIND);

        let pending = match queue.list_pending() {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!("failed to load pending {}: {e}", E::KIND);
                queue_report.load_error = Some(e.to_string());
                return queue_report;
            }
        };
        queue_report.loaded = pending.len();
        if pending.is_empty() {
            return queue_report;
        }

        tracing::info!("syncing {} pending {}", pending.len(), E::KIND);

        let batches: Vec<&[Pending<E>]> = pending.chunks(self.options.batch_size.max(1)).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            for item in batch {
                match self.apply_entry(queue, item).await {
                    Outcome::Applied => queue_report.applied += 1,
                    Outcome::Failed(class, message) => {
                        match class {
                            FailureClass::RateLimited => queue_report.rate_limited += 1,
                            FailureClass::Remote | FailureClass::Ack => queue_report.failed += 1,
                        }
                        report.failures.push(SyncFailure {
                            kind: E::KIND,
                            key: item.key.clone(),
                            issue_id: item.entry.issue_id(),
                            class,
                            message,
                        });
                    }
                }
            }

            if index + 1 < batch_count {
                sleep(self.options.batch_pause).await;
            }
        }

        queue_report.remaining = match queue.len() {
            Ok(n) => n,
            Err(_) => queue_report.loaded - queue_report.applied,
        };
        queue_report
    }

    async fn apply_entry<E: Replay>(&self, queue: &PendingQueue<E>, item: &Pending<E>) -> Outcome {
        let mut retries = 0;
        loop {
            match item.entry.replay(self.provider).await {
                Ok(()) => {
                    let outcome = match queue.ack(&item.key) {
                        Ok(()) => {
                            tracing::info!(
                                "applied {} entry {} (issue #{})",
                                E::KIND,
                                item.key,
                                item.entry.issue_id()
                            );
                            Outcome::Applied
                        }
                        Err(e) => {
                            tracing::error!(
                                "{} entry {} was applied remotely but could not be removed; \
                                 it will be applied again on the next run: {e}",
                                E::KIND,
                                item.key
                            );
                            Outcome::Failed(FailureClass::Ack, e.to_string())
                        }
                    };
                    sleep(self.options.entry_pause).await;
                    return outcome;
                }
                Err(e) if e.is_rate_limited() => {
                    tracing::warn!(
                        "rate limited on {} entry {} (issue #{}), cooling down for {}s",
                        E::KIND,
                        item.key,
                        item.entry.issue_id(),
                        self.options.rate_limit_cooldown.as_secs()
                    );
                    sleep(self.options.rate_limit_cooldown).await;

                    match self.options.rate_limit_policy {
                        RateLimitPolicy::RetryAfterCooldown { max_retries }
                            if retries < max_retries =>
                        {
                            retries += 1;
                            continue;
                        }
                        _ => return Outcome::Failed(FailureClass::RateLimited, e.to_string()),
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "failed to apply {} entry {} (issue #{}), leaving it queued: {e}",
                        E::KIND,
                        item.key,
                        item.entry.issue_id()
                    );
                    return Outcome::Failed(FailureClass::Remote, e.to_string());
                }
            }
        }
    }
}
