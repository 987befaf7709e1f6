//! Numbered storage folders.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};

/// A numbered sub-directory of a storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFolder {
    pub number: u64,
    pub path: PathBuf,
}

impl StorageFolder {
    pub fn file_count(&self) -> Result<usize> {
        Ok(folder_files(&self.path)?.len())
    }

    pub fn contains(&self, name: &OsStr) -> bool {
        self.path.join(name).exists()
    }
}

/// Parses a folder name; only canonical decimal integers qualify.
pub(crate) fn folder_number(name: &OsStr) -> Option<u64> {
    let name = name.to_str()?;
    let number = name.parse::<u64>().ok()?;
    (number.to_string() == name).then_some(number)
}

/// Lists the numbered folders under `root`, ascending by number.
///
/// A missing root has no folders. Other entries are ignored.
pub fn list_folders(root: &Path) -> Result<Vec<StorageFolder>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(CatalogError::io(root, error)),
    };

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| CatalogError::io(root, error))?;
        let file_type = entry
            .file_type()
            .map_err(|error| CatalogError::io(&entry.path(), error))?;
        if !file_type.is_dir() {
            continue;
        }
        if let Some(number) = folder_number(&entry.file_name()) {
            folders.push(StorageFolder {
                number,
                path: entry.path(),
            });
        }
    }
    folders.sort_by_key(|folder| folder.number);
    Ok(folders)
}

/// Names of the regular files directly inside `folder`, sorted.
pub(crate) fn folder_files(folder: &Path) -> Result<Vec<OsString>> {
    let entries = fs::read_dir(folder).map_err(|error| CatalogError::io(folder, error))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| CatalogError::io(folder, error))?;
        let file_type = entry
            .file_type()
            .map_err(|error| CatalogError::io(&entry.path(), error))?;
        if file_type.is_file() {
            files.push(entry.file_name());
        }
    }
    files.sort();
    Ok(files)
}

/// Number one past the highest existing folder, or 0 when there are none.
pub(crate) fn next_folder_number(folders: &[StorageFolder]) -> u64 {
    folders
        .iter()
        .map(|folder| folder.number)
        .max()
        .map_or(0, |max| max + 1)
}

pub(crate) fn create_folder(root: &Path, number: u64) -> Result<StorageFolder> {
    let path = root.join(number.to_string());
    fs::create_dir_all(&path).map_err(|error| CatalogError::io(&path, error))?;
    tracing::debug!(folder = %path.display(), "created storage folder");
    Ok(StorageFolder { number, path })
}

/// Deletes `folder` if nothing is left in it. Returns whether it was removed.
pub(crate) fn remove_if_empty(folder: &Path) -> Result<bool> {
    let occupied = fs::read_dir(folder)
        .map_err(|error| CatalogError::io(folder, error))?
        .next()
        .is_some();
    if occupied {
        return Ok(false);
    }
    fs::remove_dir(folder).map_err(|error| CatalogError::io(folder, error))?;
    tracing::debug!(folder = %folder.display(), "removed empty storage folder");
    Ok(true)
}
