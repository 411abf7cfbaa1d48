//! @ai:module:intent Define error types for workspace, catalog and comparison operations
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::{Path, PathBuf};
use thiserror::Error;

/// @ai:intent Unified error type for all fbksd library operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Settings serialization error: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    #[error("Unknown metric '{0}' (expected mse, psnr, ssim or rmse)")]
    UnknownMetric(String),

    #[error("A {kind} named '{name}' is already registered")]
    DuplicateTechnique { kind: String, name: String },

    #[error("No {kind} with id {id}")]
    UnknownTechnique { kind: String, id: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Technique {technique} already has a version tagged '{tag}'")]
    DuplicateVersionTag { technique: String, tag: String },

    #[error("Configuration '{0}' already exists")]
    ConfigExists(String),

    #[error("Invalid configuration name '{0}': names can not start with a dot")]
    InvalidConfigName(String),

    #[error("No current configuration")]
    NoCurrentConfig,

    #[error("Invalid configuration id {0}")]
    InvalidConfigId(usize),

    #[error("Slot '{0}' already exists")]
    SlotExists(String),

    #[error("Invalid slot id {0}")]
    InvalidSlotId(usize),

    #[error("{0} is not a symlink")]
    NotASymlink(PathBuf),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },

    #[error("{tool} did not produce {path}")]
    MissingOutput { tool: String, path: PathBuf },
}

impl Error {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Error::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Error::FileWrite {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// @ai:intent Read and deserialize a JSON document, mapping failures to path-aware errors
/// @ai:effects fs:read
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::json(path, e))
}

/// @ai:intent Serialize a value as pretty JSON into a file
/// @ai:effects fs:write
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).map_err(|e| Error::write(path, e))
}
