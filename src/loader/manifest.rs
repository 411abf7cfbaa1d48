//! @ai:module:intent On-disk document shapes read by the loaders
//! @ai:module:layer infrastructure
//! @ai:module:public_api RendererManifest, TechniqueManifest, VersionManifest, SceneDescriptor, ScenesCacheEntry, ErrorLog, ExecutionLog
//! @ai:module:stateless true

use crate::model::{ImageRegion, NoiseWeights};
use serde::{Deserialize, Serialize};

/// @ai:intent Renderer `info.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RendererManifest {
    pub name: String,
    /// Executable, relative to the renderer folder
    pub exec: String,
}

/// @ai:intent Technique `info.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TechniqueManifest {
    pub short_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub citation: String,
    #[serde(default)]
    pub versions: Option<Vec<VersionManifest>>,
}

/// @ai:intent One entry of the `versions` list of a technique manifest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VersionManifest {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    /// Executable, relative to the technique folder
    pub executable: String,
}

/// @ai:intent Scene description as found in `fbksd-scene(s).json` and in the scenes cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub name: String,
    pub path: String,
    #[serde(rename = "ref-img")]
    pub ref_img: String,
    #[serde(rename = "ref", default)]
    pub reference_scene: String,
    #[serde(flatten)]
    pub weights: NoiseWeights,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<ImageRegion>,
}

/// @ai:intent Scenes of one renderer in the scenes cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenesCacheEntry {
    pub renderer: String,
    pub scenes: Vec<SceneDescriptor>,
}

/// @ai:intent Comparator output `errors.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLog {
    pub mse: f64,
    pub psnr: f64,
    pub ssim: f64,
    #[serde(default)]
    pub rmse: Option<f64>,
}

/// @ai:intent Benchmark execution log `<spp>_<replica>_log.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    #[serde(default)]
    pub aborted: bool,
    pub reconstruction_time: Timing,
    pub rendering_time: Timing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub time_ms: f64,
}
