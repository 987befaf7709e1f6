//! Libraries by name plus the storage roots that back them.
//!
//! Directory layout under the repository root:
//!
//! ```text
//! root/
//! ├── catalog.json          configuration (capacity, storage dir name)
//! └── <library>/
//!     └── files/            numbered folders, see `storage`
//!         ├── 0/
//!         └── 1/
//! ```
//!
//! Libraries themselves are held in memory; loading and saving their
//! metadata belongs to the embedding application.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{load_or_create_config, CatalogConfig, CATALOG_CONFIG_FILENAME};
use crate::error::{CatalogError, Result};
use crate::item::Item;
use crate::library::Library;
use crate::storage::{RebalanceReport, StorageRoot, StorageStats};

#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    config: CatalogConfig,
    libraries: BTreeMap<String, Library>,
}

impl Repository {
    /// Opens the repository at `root`, reading (or creating) its config once.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = load_or_create_config(&root)?;
        tracing::info!(
            root = %root.display(),
            max_files_per_folder = config.max_files_per_folder,
            "opened catalog repository"
        );
        Ok(Self {
            root,
            config,
            libraries: BTreeMap::new(),
        })
    }

    /// Uses an explicit configuration instead of the one on disk.
    pub fn with_config(root: impl Into<PathBuf>, config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: root.into(),
            config,
            libraries: BTreeMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn create_library(&mut self, name: &str) -> Result<&mut Library> {
        let name = name.trim();
        validate_library_name(name)?;
        let key = library_key(name);
        if self.libraries.contains_key(&key) {
            return Err(CatalogError::Duplicate(format!("library {name}")));
        }
        tracing::debug!(library = name, "created library");
        Ok(self.libraries.entry(key).or_insert_with(|| Library::new(name)))
    }

    pub fn library(&self, name: &str) -> Result<&Library> {
        self.libraries
            .get(&library_key(name))
            .ok_or_else(|| CatalogError::LibraryNotFound(name.to_string()))
    }

    pub fn library_mut(&mut self, name: &str) -> Result<&mut Library> {
        self.libraries
            .get_mut(&library_key(name))
            .ok_or_else(|| CatalogError::LibraryNotFound(name.to_string()))
    }

    /// Forgets a library. Its stored files are left on disk.
    pub fn remove_library(&mut self, name: &str) -> Result<Library> {
        self.libraries
            .remove(&library_key(name))
            .ok_or_else(|| CatalogError::LibraryNotFound(name.to_string()))
    }

    pub fn library_names(&self) -> Vec<&str> {
        self.libraries.values().map(Library::name).collect()
    }

    pub fn set_layout(&mut self, library: &str, layout: &str) -> Result<()> {
        self.library_mut(library)?.set_layout(layout)
    }

    pub fn query(
        &self,
        library: &str,
        filter: &str,
        sort: &str,
        name_filter: &str,
    ) -> Result<Vec<&Item>> {
        self.library(library)?.query(filter, sort, name_filter)
    }

    pub fn storage(&self, library: &str) -> Result<StorageRoot> {
        let library = self.library(library)?;
        StorageRoot::new(
            self.root
                .join(library.name())
                .join(&self.config.storage_dir_name),
            self.config.max_files_per_folder,
        )
    }

    /// Moves `source` into the library's storage and returns its new path.
    pub fn store_file(&self, library: &str, source: &Path) -> Result<PathBuf> {
        self.storage(library)?.store(source)
    }

    pub fn locate_file(&self, library: &str, file_name: &str) -> Result<Option<PathBuf>> {
        self.storage(library)?.locate(file_name)
    }

    pub fn delete_file(&self, library: &str, file_name: &str) -> Result<PathBuf> {
        self.storage(library)?.remove(file_name)
    }

    pub fn rebalance(&self, library: &str) -> Result<RebalanceReport> {
        self.storage(library)?.rebalance()
    }

    pub fn storage_stats(&self, library: &str) -> Result<StorageStats> {
        self.storage(library)?.stats()
    }
}

fn library_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_library_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.eq_ignore_ascii_case(CATALOG_CONFIG_FILENAME)
    {
        return Err(CatalogError::Validation(format!(
            "invalid library name {name:?}"
        )));
    }
    Ok(())
}
