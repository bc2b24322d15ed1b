//! File I/O operations

use crate::{Result, StoreError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write `data` to `path` through a temporary file in the same directory,
/// so readers see either the old file or the complete new one
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if path.file_name().is_none() {
        return Err(StoreError::InvalidPath(path.display().to_string()));
    }
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

/// Write an exported document named `file_name` into `dir`, returning the
/// full path
pub fn save_export(dir: impl AsRef<Path>, file_name: &str, data: &[u8]) -> Result<PathBuf> {
    let name = Path::new(file_name);
    let is_plain_name = name.components().count() == 1 && name.file_name().is_some();
    if !is_plain_name {
        return Err(StoreError::InvalidPath(file_name.to_string()));
    }
    let path = dir.as_ref().join(name);
    write_atomic(&path, data)?;
    tracing::info!(path = %path.display(), bytes = data.len(), "export saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_and_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.pdf");

        write_atomic(&path, b"first").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        // No temporary files are left behind
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("settings.json");
        write_atomic(&path, b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_export() {
        let temp_dir = TempDir::new().unwrap();
        let path = save_export(temp_dir.path(), "Invoice-INV1-Acme_Ltd.pdf", b"%PDF-1.4").unwrap();
        assert_eq!(path, temp_dir.path().join("Invoice-INV1-Acme_Ltd.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_save_export_rejects_paths() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["../escape.pdf", "a/b.pdf", "", ".."] {
            assert!(
                matches!(save_export(temp_dir.path(), name, b"x"), Err(StoreError::InvalidPath(_))),
                "{:?} accepted",
                name
            );
        }
    }
}
