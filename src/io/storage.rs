//! Crash-safe file writes
//!
//! Every save replaces a whole data file. The new content is written to a
//! temporary file in the same directory, synced, and renamed over the target,
//! so readers only ever observe the old file or the complete new one.

use crate::types::AtmError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Replace `path` with the bytes produced by `write`
///
/// # Errors
///
/// Returns `AtmError::Storage` if the temporary file cannot be created,
/// synced or renamed, and propagates any error returned by `write`. On error
/// the target file is left untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), AtmError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), AtmError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| AtmError::storage(dir, e))?;

    write(&mut file)?;

    file.as_file()
        .sync_all()
        .map_err(|e| AtmError::storage(path, e))?;
    file.persist(path)
        .map_err(|e| AtmError::storage(path, e.error))?;

    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Path of the copy kept when a damaged data file is loaded
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Copy `path` aside so the next save cannot destroy it
///
/// Returns the path of the copy.
pub fn preserve_copy(path: &Path) -> Result<PathBuf, AtmError> {
    let backup = backup_path(path);
    fs::copy(path, &backup).map_err(|e| AtmError::storage(&backup, e))?;
    Ok(backup)
}
