//! @ai:module:intent Directory of named configurations with a current-configuration pointer
//! @ai:module:layer infrastructure
//! @ai:module:public_api ConfigStore, CURRENT_CONFIG_LINK
//! @ai:module:stateless false

use crate::configuration::document::ConfigDocument;
use crate::error::{write_json, Error, Result};
use crate::workspace::{link_target_name, list_entries, relink, Entry};
use std::path::{Path, PathBuf};

/// Pointer to the current configuration inside the configs directory.
pub const CURRENT_CONFIG_LINK: &str = ".current.json";

/// @ai:intent Lists, creates and selects configuration files
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn link(&self) -> PathBuf {
        self.dir.join(CURRENT_CONFIG_LINK)
    }

    /// @ai:effects pure
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// @ai:intent Configurations sorted by creation time, the pointer excluded
    /// @ai:effects fs:read
    pub fn list(&self) -> Result<Vec<Entry>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let current = self.current_name();
        list_entries(&self.dir, current.as_deref(), |path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "json")
        })
    }

    /// @ai:effects fs:read
    pub fn current_name(&self) -> Option<String> {
        link_target_name(&self.link())
    }

    /// @ai:intent File of the current configuration
    /// @ai:effects fs:read
    pub fn current_path(&self) -> Result<PathBuf> {
        let link = self.link();
        if link.is_file() {
            Ok(link)
        } else {
            Err(Error::NoCurrentConfig)
        }
    }

    /// @ai:intent File of the configuration at a 1-based position of `list()`
    /// @ai:effects fs:read
    pub fn path_by_index(&self, index: usize) -> Result<PathBuf> {
        let entries = self.list()?;
        index
            .checked_sub(1)
            .and_then(|i| entries.get(i))
            .map(|entry| self.path_of(&entry.name))
            .ok_or(Error::InvalidConfigId(index))
    }

    /// @ai:intent Write a new configuration and make it current
    /// @ai:effects fs:write
    pub fn create(&self, name: &str, document: &ConfigDocument) -> Result<PathBuf> {
        if name.is_empty() || name.starts_with('.') {
            return Err(Error::InvalidConfigName(name.to_string()));
        }
        let path = self.path_of(name);
        if path.exists() {
            return Err(Error::ConfigExists(name.to_string()));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::write(&self.dir, e))?;
        write_json(&path, document)?;
        relink(&self.link(), &format!("{}.json", name))?;
        tracing::info!("Created configuration '{}'", name);
        Ok(path)
    }

    /// @ai:intent Make the configuration at a 1-based position current
    /// @ai:effects fs:write
    pub fn select(&self, index: usize) -> Result<String> {
        let entries = self.list()?;
        let entry = index
            .checked_sub(1)
            .and_then(|i| entries.get(i))
            .ok_or(Error::InvalidConfigId(index))?;
        relink(&self.link(), &format!("{}.json", entry.name))?;
        Ok(entry.name.clone())
    }
}
