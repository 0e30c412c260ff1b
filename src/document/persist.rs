//! Write-then-rename persistence

use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Replace `path` atomically.
///
/// `write` fills a temp file created next to `path`; the temp file is then
/// synced and renamed over the target. On any failure the temp file is
/// removed and `path` keeps its previous content. The target's permissions
/// are carried over when it already exists.
pub fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".zap-merge")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    if let Ok(meta) = fs::metadata(path) {
        temp.as_file().set_permissions(meta.permissions())?;
    }

    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
