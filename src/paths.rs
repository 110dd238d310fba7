use std::path::{Path, PathBuf};

/// Returns the root Hermes directory path.
///
/// Resolution order:
/// 1. `HERMES_ROOT` environment variable (if set)
/// 2. Current working directory + `.hermes`
pub fn hermes_root() -> PathBuf {
    if let Ok(root) = std::env::var("HERMES_ROOT")
        && !root.is_empty()
    {
        PathBuf::from(root)
    } else {
        PathBuf::from(".hermes")
    }
}

/// Directory layout below a Hermes root.
///
/// Every component takes one of these instead of reading the environment,
/// so tests can point everything at a temp directory.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at [`hermes_root`].
    pub fn from_env() -> Self {
        Self::new(hermes_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn lease_path(&self) -> PathBuf {
        self.root.join("sync.lock")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn pending_dir(&self) -> PathBuf {
        self.root.join("pending")
    }
}
