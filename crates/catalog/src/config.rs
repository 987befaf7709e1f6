use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};

pub const CATALOG_CONFIG_FILENAME: &str = "catalog.json";
pub const CATALOG_CONFIG_VERSION: &str = "1.0.0";
pub const DEFAULT_MAX_FILES_PER_FOLDER: usize = 1000;
pub const DEFAULT_STORAGE_DIR_NAME: &str = "files";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub version: String,
    /// Upper bound on the number of files a single storage folder may hold.
    pub max_files_per_folder: usize,
    /// Name of the directory under each library that holds numbered folders.
    #[serde(default = "default_storage_dir_name")]
    pub storage_dir_name: String,
}

fn default_storage_dir_name() -> String {
    DEFAULT_STORAGE_DIR_NAME.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            version: CATALOG_CONFIG_VERSION.to_string(),
            max_files_per_folder: DEFAULT_MAX_FILES_PER_FOLDER,
            storage_dir_name: default_storage_dir_name(),
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_files_per_folder == 0 {
            return Err(CatalogError::Config(
                "max_files_per_folder must be a positive integer".to_string(),
            ));
        }
        let name = self.storage_dir_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(CatalogError::Config(format!(
                "invalid storage_dir_name {name:?}"
            )));
        }
        Ok(())
    }
}

pub fn load_or_create_config(dir: &Path) -> Result<CatalogConfig> {
    std::fs::create_dir_all(dir).map_err(|error| CatalogError::io(dir, error))?;

    let path = config_path(dir);
    if !path.exists() {
        let config = CatalogConfig::default();
        write_config(&path, &config)?;
        return Ok(config);
    }

    let data = std::fs::read_to_string(&path).map_err(|error| CatalogError::io(&path, error))?;
    let config: CatalogConfig = serde_json::from_str(&data).map_err(|error| {
        CatalogError::Config(format!(
            "failed to parse catalog config {}: {error}",
            path.display()
        ))
    })?;
    if config.version != CATALOG_CONFIG_VERSION {
        return Err(CatalogError::Config(format!(
            "unsupported catalog config version {} (expected {CATALOG_CONFIG_VERSION})",
            config.version
        )));
    }
    config.validate()?;

    Ok(config)
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CATALOG_CONFIG_FILENAME)
}

pub fn write_config(path: &Path, config: &CatalogConfig) -> Result<()> {
    config.validate()?;
    let data = serde_json::to_string_pretty(config).map_err(|error| {
        CatalogError::Config(format!(
            "failed to serialize catalog config {}: {error}",
            path.display()
        ))
    })?;
    std::fs::write(path, data).map_err(|error| CatalogError::io(path, error))?;
    Ok(())
}
