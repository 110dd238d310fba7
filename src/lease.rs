//! Single-writer lease for sync runs.
//!
//! Two overlapping sync runs would both read the same pending entries and
//! apply them twice. The lease is a `sync.lock` file holding the owner's pid
//! and acquisition time under an exclusive advisory lock. The OS drops the
//! lock when its holder exits, so a lease file whose lock can be taken was
//! left behind by a dead run and is reclaimed on the spot.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{HermesError, Result};
use crate::fs::ensure_parent_dir;

/// Attempts before giving up when the lease file keeps being replaced under us.
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseOwner {
    pub pid: u32,
    /// RFC 3339 acquisition time
    pub acquired_at: String,
}

impl LeaseOwner {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            acquired_at: jiff::Timestamp::now().to_string(),
        }
    }
}

/// Held lease. Released (file removed, lock dropped) on drop.
#[derive(Debug)]
pub struct SyncLease {
    path: PathBuf,
    file: File,
}

impl SyncLease {
    pub fn acquire(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;

        for _ in 0..MAX_ATTEMPTS {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(path)
                .map_err(|e| lease_error("open", path, e))?;

            if file.try_lock_exclusive().is_err() {
                let pid = read_owner(&mut file).map(|o| o.pid).unwrap_or(0);
                return Err(HermesError::LeaseHeld {
                    path: path.to_path_buf(),
                    pid,
                });
            }

            // The previous holder may have removed the file between our open
            // and our lock; then we locked an orphaned inode.
            if !is_same_file(&file, path) {
                let _ = FileExt::unlock(&file);
                continue;
            }

            if let Some(previous) = read_owner(&mut file) {
                tracing::warn!(
                    "reclaiming sync lease left by pid {} (acquired {})",
                    previous.pid,
                    previous.acquired_at
                );
            }

            let owner = serde_json::to_string(&LeaseOwner::current())?;
            let write_owner = |file: &mut File| -> std::io::Result<()> {
                file.set_len(0)?;
                file.seek(SeekFrom::Start(0))?;
                file.write_all(owner.as_bytes())?;
                file.sync_all()
            };
            write_owner(&mut file).map_err(|e| lease_error("write", path, e))?;

            return Ok(Self {
                path: path.to_path_buf(),
                file,
            });
        }

        Err(HermesError::LeaseHeld {
            path: path.to_path_buf(),
            pid: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SyncLease {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("failed to remove sync lease {}: {e}", self.path.display());
        }
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(unix)]
fn is_same_file(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(locked), Ok(current)) => {
            locked.dev() == current.dev() && locked.ino() == current.ino()
        }
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(_file: &File, path: &Path) -> bool {
    path.exists()
}

fn read_owner(file: &mut File) -> Option<LeaseOwner> {
    let mut content = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut content).ok()?;
    if content.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&content).ok()
}

fn lease_error(operation: &'static str, path: &Path, source: std::io::Error) -> HermesError {
    HermesError::Durability {
        operation,
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_leftover(path: &Path, pid: u32) -> LeaseOwner {
        let leftover = LeaseOwner {
            pid,
            acquired_at: jiff::Timestamp::now().to_string(),
        };
        std::fs::write(path, serde_json::to_string(&leftover).unwrap()).unwrap();
        leftover
    }

    #[test]
    fn test_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync.lock");

        {
            let lease = SyncLease::acquire(&path).unwrap();
            assert!(lease.path().exists());
            let owner: LeaseOwner =
                serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
            assert_eq!(owner.pid, std::process::id());
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_live_lease_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync.lock");

        let _held = SyncLease::acquire(&path).unwrap();
        match SyncLease::acquire(&path).unwrap_err() {
            HermesError::LeaseHeld { pid, .. } => assert_eq!(pid, std::process::id()),
            other => panic!("expected LeaseHeld, got {other:?}"),
        }
        assert!(path.exists());
    }

    #[test]
    fn test_lease_from_dead_run_is_reclaimed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync.lock");
        // Fresh record, but nobody holds the lock: the run that wrote it is gone.
        write_leftover(&path, 4_000_000);

        let lease = SyncLease::acquire(&path).unwrap();
        let owner: LeaseOwner =
            serde_json::from_str(&std::fs::read_to_string(lease.path()).unwrap()).unwrap();
        assert_eq!(owner.pid, std::process::id());
    }

    #[test]
    fn test_locked_leftover_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync.lock");
        let leftover = write_leftover(&path, 4_000_000);

        let holder = File::open(&path).unwrap();
        holder.lock_exclusive().unwrap();

        match SyncLease::acquire(&path).unwrap_err() {
            HermesError::LeaseHeld { pid, .. } => assert_eq!(pid, leftover.pid),
            other => panic!("expected LeaseHeld, got {other:?}"),
        }

        FileExt::unlock(&holder).unwrap();
        assert!(SyncLease::acquire(&path).is_ok());
    }

    #[test]
    fn test_reacquire_after_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync.lock");

        drop(SyncLease::acquire(&path).unwrap());
        assert!(SyncLease::acquire(&path).is_ok());
    }

    #[test]
    fn test_garbage_lease_file_is_reclaimed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync.lock");
        std::fs::write(&path, "garbage").unwrap();

        assert!(SyncLease::acquire(&path).is_ok());
    }
}
