//! @ai:module:intent Workspace settings: directory layout, external tools and defaults
//! @ai:module:layer infrastructure
//! @ai:module:public_api WorkspaceConfig, PathConfig, ToolConfig, DefaultsConfig
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::metrics::Metric;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file looked up in the workspace root.
pub const SETTINGS_FILE: &str = "fbksd.toml";

/// Environment variable overriding the tools install prefix.
pub const INSTALL_DIR_ENV: &str = "FBKSD_INSTALL_DIR";

/// @ai:intent Main settings for a benchmark workspace
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub tools: ToolConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// @ai:intent Workspace directories, relative to the workspace root
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_scenes_dir")]
    pub scenes_dir: PathBuf,
    #[serde(default = "default_renderers_dir")]
    pub renderers_dir: PathBuf,
    #[serde(default = "default_denoisers_dir")]
    pub denoisers_dir: PathBuf,
    #[serde(default = "default_samplers_dir")]
    pub samplers_dir: PathBuf,
    #[serde(default = "default_configs_dir")]
    pub configs_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// File name of the scenes cache inside the scenes directory
    #[serde(default = "default_scenes_cache")]
    pub scenes_cache: String,
}

/// @ai:intent Locations of the external executables
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Install prefix; `FBKSD_INSTALL_DIR` wins over this value
    #[serde(default)]
    pub install_prefix: Option<PathBuf>,
    #[serde(default = "default_benchmark")]
    pub benchmark: PathBuf,
    #[serde(default = "default_compare")]
    pub compare: PathBuf,
    #[serde(default = "default_exr2png")]
    pub exr2png: PathBuf,
}

/// @ai:intent Defaults used when the user does not give explicit values
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_spps")]
    pub spps: Vec<u32>,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            scenes_dir: default_scenes_dir(),
            renderers_dir: default_renderers_dir(),
            denoisers_dir: default_denoisers_dir(),
            samplers_dir: default_samplers_dir(),
            configs_dir: default_configs_dir(),
            results_dir: default_results_dir(),
            scenes_cache: default_scenes_cache(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            install_prefix: None,
            benchmark: default_benchmark(),
            compare: default_compare(),
            exr2png: default_exr2png(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            spps: default_spps(),
            metrics: default_metrics(),
        }
    }
}

fn default_scenes_dir() -> PathBuf {
    PathBuf::from("scenes")
}

fn default_renderers_dir() -> PathBuf {
    PathBuf::from("renderers")
}

fn default_denoisers_dir() -> PathBuf {
    PathBuf::from("denoisers")
}

fn default_samplers_dir() -> PathBuf {
    PathBuf::from("samplers")
}

fn default_configs_dir() -> PathBuf {
    PathBuf::from("configs")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_scenes_cache() -> String {
    ".fbksd-scenes-cache.json".to_string()
}

fn default_benchmark() -> PathBuf {
    PathBuf::from("bin/fbksd-benchmark")
}

fn default_compare() -> PathBuf {
    PathBuf::from("bin/fbksd-compare")
}

fn default_exr2png() -> PathBuf {
    PathBuf::from("bin/fbksd-exr2png")
}

fn default_spps() -> Vec<u32> {
    vec![2, 4, 8, 16]
}

fn default_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

impl WorkspaceConfig {
    /// @ai:intent Load settings from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        toml::from_str(&content).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// @ai:intent Save settings to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::write(path, e))
    }

    /// @ai:intent Load `fbksd.toml` from the workspace root, or fall back to defaults
    /// @ai:effects fs:read
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);
        if path.is_file() {
            tracing::debug!("Loading settings from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

impl ToolConfig {
    /// @ai:intent Resolve the install prefix from the environment, the settings or the running binary
    /// @ai:effects env
    pub fn install_prefix(&self) -> PathBuf {
        if let Some(dir) = std::env::var_os(INSTALL_DIR_ENV) {
            return PathBuf::from(dir);
        }
        if let Some(prefix) = &self.install_prefix {
            return prefix.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// @ai:effects env
    pub fn benchmark_exec(&self) -> PathBuf {
        self.install_prefix().join(&self.benchmark)
    }

    /// @ai:effects env
    pub fn compare_exec(&self) -> PathBuf {
        self.install_prefix().join(&self.compare)
    }

    /// @ai:effects env
    pub fn exr2png_exec(&self) -> PathBuf {
        self.install_prefix().join(&self.exr2png)
    }
}
