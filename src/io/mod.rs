pub mod walker;

pub use walker::FileWalker;

use crate::errors::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

pub fn read_file(path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path)
}

/// Replace `path` with `content`, atomic-or-untouched.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over the target, so a failure leaves the original intact. An
/// existing target keeps its permissions.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::file_system("Failed to create temporary file", dir, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| Error::file_system("Failed to write temporary file", temp.path(), e))?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::file_system("Failed to copy permissions", temp.path(), e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::file_system("Failed to flush temporary file", temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| Error::file_system("Failed to replace file", path, e.error))?;
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| Error::file_system("Failed to create", path, e))?;
    }
    Ok(())
}
