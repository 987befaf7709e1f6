//! Folder selection for new files.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use super::folders::{create_folder, list_folders, next_folder_number};
use crate::error::{CatalogError, Result};

/// Chooses the folder under `root` that should receive `file_name`.
///
/// The lowest-numbered folder that holds fewer than `capacity` files and has
/// no entry called `file_name` wins. When none qualifies a new folder is
/// created one past the current maximum. Nothing is written besides that
/// folder (and `root` itself if it was missing).
pub fn place_file(root: &Path, capacity: usize, file_name: &str) -> Result<PathBuf> {
    validate_file_name(file_name)?;
    if capacity == 0 {
        return Err(CatalogError::Validation(
            "folder capacity must be at least 1".to_string(),
        ));
    }
    fs::create_dir_all(root).map_err(|error| CatalogError::io(root, error))?;

    let folders = list_folders(root)?;
    for folder in &folders {
        if folder.contains(OsStr::new(file_name)) {
            continue;
        }
        if folder.file_count()? < capacity {
            tracing::debug!(file = file_name, folder = %folder.path.display(), "placed file");
            return Ok(folder.path.clone());
        }
    }

    let folder = create_folder(root, next_folder_number(&folders))?;
    tracing::debug!(file = file_name, folder = %folder.path.display(), "placed file in new folder");
    Ok(folder.path)
}

pub(crate) fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\'])
    {
        return Err(CatalogError::Validation(format!(
            "invalid file name {file_name:?}"
        )));
    }
    Ok(())
}
