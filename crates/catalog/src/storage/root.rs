//! Per-library facade over a numbered-folder storage root.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use super::allocator::{place_file, validate_file_name};
use super::folders::{list_folders, StorageFolder};
use super::mover::{move_file, MoveOutcome};
use super::rebalancer::{rebalance, RebalanceReport};
use crate::error::{CatalogError, Result};

/// Snapshot of how files are spread over a storage root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub folders: usize,
    pub files: usize,
    /// Folders currently holding more than the capacity allows.
    pub oversized: usize,
}

/// The numbered-folder store of one library.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    root: PathBuf,
    capacity: usize,
}

impl StorageRoot {
    pub fn new(root: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CatalogError::Validation(
                "folder capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            root: root.into(),
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Folder that should receive a file called `file_name`.
    pub fn place(&self, file_name: &str) -> Result<PathBuf> {
        place_file(&self.root, self.capacity, file_name)
    }

    /// Moves `source` into storage under its own file name.
    pub fn store(&self, source: &Path) -> Result<PathBuf> {
        let file_name = source
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| {
                CatalogError::Validation(format!(
                    "{} has no usable file name",
                    source.display()
                ))
            })?;
        self.store_as(source, file_name)
    }

    /// Moves `source` into storage as `file_name`, returning its new path.
    pub fn store_as(&self, source: &Path, file_name: &str) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(CatalogError::FileNotFound(source.display().to_string()));
        }
        let folder = self.place(file_name)?;
        let destination = folder.join(file_name);
        match move_file(source, &destination)? {
            MoveOutcome::Moved => {
                tracing::debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "stored file"
                );
                Ok(destination)
            }
            MoveOutcome::Collision => Err(CatalogError::Duplicate(format!(
                "{} already exists",
                destination.display()
            ))),
        }
    }

    /// Finds the folder holding `file_name`, lowest number first.
    pub fn locate(&self, file_name: &str) -> Result<Option<PathBuf>> {
        validate_file_name(file_name)?;
        Ok(self
            .folders()?
            .into_iter()
            .map(|folder| folder.path.join(file_name))
            .find(|path| path.is_file()))
    }

    /// Deletes a stored file, returning the path it had.
    ///
    /// The folder is kept even if this empties it; rebalancing removes it.
    pub fn remove(&self, file_name: &str) -> Result<PathBuf> {
        let path = self
            .locate(file_name)?
            .ok_or_else(|| CatalogError::FileNotFound(file_name.to_string()))?;
        fs::remove_file(&path).map_err(|error| CatalogError::io(&path, error))?;
        tracing::debug!(file = %path.display(), "removed stored file");
        Ok(path)
    }

    pub fn folders(&self) -> Result<Vec<StorageFolder>> {
        list_folders(&self.root)
    }

    pub fn stats(&self) -> Result<StorageStats> {
        let mut stats = StorageStats::default();
        for folder in self.folders()? {
            let count = folder.file_count()?;
            stats.folders += 1;
            stats.files += count;
            if count > self.capacity {
                stats.oversized += 1;
            }
        }
        Ok(stats)
    }

    pub fn rebalance(&self) -> Result<RebalanceReport> {
        rebalance(&self.root, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn incoming(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).expect("write incoming");
        path
    }

    #[test]
    fn stores_locates_and_removes() {
        let dir = tempdir().expect("tempdir");
        let inbox = tempdir().expect("inbox");
        let storage = StorageRoot::new(dir.path().join("files"), 2).expect("storage");

        let stored = storage.store(&incoming(inbox.path(), "a.epub")).expect("store");
        assert_eq!(stored, dir.path().join("files").join("0").join("a.epub"));
        assert_eq!(storage.locate("a.epub").expect("locate"), Some(stored.clone()));

        storage.remove("a.epub").expect("remove");
        assert!(!stored.exists());
        assert!(storage.locate("a.epub").expect("locate").is_none());
        assert!(matches!(
            storage.remove("a.epub"),
            Err(CatalogError::FileNotFound(_))
        ));
    }

    #[test]
    fn sequential_stores_respect_capacity() {
        let dir = tempdir().expect("tempdir");
        let inbox = tempdir().expect("inbox");
        let capacity = 2;
        let storage = StorageRoot::new(dir.path(), capacity).expect("storage");
        for index in 0..=capacity {
            storage
                .store(&incoming(inbox.path(), &format!("f{index}")))
                .expect("store");
        }

        let stats = storage.stats().expect("stats");
        assert_eq!(stats.files, capacity + 1);
        assert!(stats.folders >= 2);
        assert_eq!(stats.oversized, 0);
    }

    #[test]
    fn same_name_goes_to_another_folder() {
        let dir = tempdir().expect("tempdir");
        let inbox = tempdir().expect("inbox");
        let storage = StorageRoot::new(dir.path(), 10).expect("storage");
        let first = storage.store(&incoming(inbox.path(), "x")).expect("first");
        let second = storage.store(&incoming(inbox.path(), "x")).expect("second");
        assert_ne!(first.parent(), second.parent());
    }

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let storage = StorageRoot::new(dir.path(), 1).expect("storage");
        assert!(matches!(
            storage.store(&dir.path().join("ghost")),
            Err(CatalogError::FileNotFound(_))
        ));
        assert!(storage.folders().expect("folders").is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(StorageRoot::new("/tmp/unused", 0).is_err());
    }
}
