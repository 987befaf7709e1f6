//! Non-overwriting file moves.

use std::fs;
use std::path::Path;

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Something already exists at the destination; nothing was touched.
    Collision,
}

/// Moves `source` to `destination` unless the destination already exists.
///
/// Falls back to copy-then-remove when a rename is not possible (for example
/// across devices). The source is only removed after the copy succeeded, and a
/// failed copy leaves no partial destination behind.
pub fn move_file(source: &Path, destination: &Path) -> Result<MoveOutcome> {
    if destination.exists() {
        return Ok(MoveOutcome::Collision);
    }

    if let Err(rename_error) = fs::rename(source, destination) {
        if !source.exists() {
            return Err(CatalogError::io(source, rename_error));
        }
        tracing::debug!(
            source = %source.display(),
            error = %rename_error,
            "rename failed, copying instead"
        );
        if let Err(error) = fs::copy(source, destination) {
            let _ = fs::remove_file(destination);
            return Err(CatalogError::io(destination, error));
        }
        fs::remove_file(source).map_err(|error| CatalogError::io(source, error))?;
    }

    Ok(MoveOutcome::Moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn moves_file() {
        let dir = tempdir().expect("tempdir");
        let source = dir.path().join("a.txt");
        let destination = dir.path().join("b.txt");
        fs::write(&source, b"hello").expect("write");

        assert_eq!(move_file(&source, &destination).expect("move"), MoveOutcome::Moved);
        assert!(!source.exists());
        assert_eq!(fs::read(&destination).expect("read"), b"hello");
    }

    #[test]
    fn never_overwrites() {
        let dir = tempdir().expect("tempdir");
        let source = dir.path().join("a.txt");
        let destination = dir.path().join("b.txt");
        fs::write(&source, b"new").expect("write");
        fs::write(&destination, b"old").expect("write");

        assert_eq!(
            move_file(&source, &destination).expect("move"),
            MoveOutcome::Collision
        );
        assert_eq!(fs::read(&source).expect("read"), b"new");
        assert_eq!(fs::read(&destination).expect("read"), b"old");
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = move_file(&dir.path().join("nope"), &dir.path().join("dest"))
            .expect_err("missing source");
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
