//! Simple file I/O utilities shared by the cache and the pending queues

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{HermesError, Result};

/// Extension used for in-flight writes. Files carrying it are never valid entries.
pub const TEMP_EXTENSION: &str = "tmp";

/// Read file content with error handling
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| HermesError::Durability {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write file atomically using temp file and rename.
///
/// The temp file is flushed to disk before the rename, so after this returns
/// either the new content is fully in place or the original file is unchanged.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    ensure_parent_dir(path)?;

    let temp_path = path.with_extension(TEMP_EXTENSION);

    let write_temp = || -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    };
    write_temp().map_err(|e| HermesError::Durability {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| HermesError::Durability {
        operation: "rename",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Ensure parent directory exists
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Create a directory and any missing parents
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| HermesError::Durability {
        operation: "create directory",
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Delete a file with error handling
pub fn delete_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| HermesError::Durability {
        operation: "delete",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Find all `.json` files in a directory, returning their file stems.
///
/// Returns an empty vector if the directory doesn't exist.
/// Returns an error if the directory exists but cannot be read.
pub fn find_json_stems(dir_path: &Path) -> std::io::Result<Vec<String>> {
    match fs::read_dir(dir_path) {
        Ok(entries) => Ok(entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
