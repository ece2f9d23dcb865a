//! Filesystem helpers for writing output trees.
//!
//! Every helper creates missing parent directories and maps failures to
//! messages naming the path involved.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};

fn io_error(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        err.kind(),
        format!("Failed to {} '{}': {}", action, path.display(), err),
    ))
}

/// Remove `dir` if it exists and create it empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| io_error("remove directory", dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| io_error("create directory", dir, e))?;
    Ok(())
}

/// Create `dir` and its parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| io_error("create directory", dir, e))
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).map_err(|e| io_error("copy file", src, e))?;
    Ok(())
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, content).map_err(|e| io_error("write file", path, e))
}

/// Recursively copy `src` into `dst`. Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
