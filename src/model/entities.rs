//! @ai:module:intent Entities of the benchmark catalog: renderers, scenes, techniques, versions, results
//! @ai:module:layer domain
//! @ai:module:public_api RendererId, SceneId, TechniqueId, VersionId, ResultId, Renderer, Scene, ImageRegion, NoiseWeights, TechniqueKind, Technique, TechniqueVersion, VersionStatus, TechniqueResult, ResultRecord
//! @ai:module:stateless true

use crate::metrics::Metric;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tag of the single, unlabeled version of a technique.
pub const DEFAULT_TAG: &str = "default";

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Ids are 1-based positions in the owning registry.
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32 + 1)
            }

            pub(crate) fn index(self) -> usize {
                (self.0 as usize).wrapping_sub(1)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// @ai:intent Identity of a renderer within one catalog load
    RendererId
);
entity_id!(
    /// @ai:intent Identity of a scene within one catalog load
    SceneId
);
entity_id!(
    /// @ai:intent Identity of a technique within its kind
    TechniqueId
);
entity_id!(
    /// @ai:intent Identity of a technique version within its kind
    VersionId
);
entity_id!(
    /// @ai:intent Identity of a result within its kind
    ResultId
);

/// @ai:intent Per-noise-source weights of a scene or region, each in [0, 1]
/// @ai:effects pure
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseWeights {
    #[serde(rename = "dof_w", default)]
    pub defocus: f64,
    #[serde(rename = "mb_w", default)]
    pub motion_blur: f64,
    #[serde(rename = "ss_w", default)]
    pub soft_shadow: f64,
    #[serde(rename = "glossy_w", default)]
    pub glossy: f64,
    #[serde(rename = "gi_w", default)]
    pub global_illumination: f64,
}

/// @ai:intent Sub-rectangle of a scene image with its own noise weights
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRegion {
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
    #[serde(flatten)]
    pub weights: NoiseWeights,
}

/// @ai:intent A renderer installation owning a set of scenes
#[derive(Debug, Clone, PartialEq)]
pub struct Renderer {
    pub id: RendererId,
    pub name: String,
    /// Absent for placeholders of renderers that are no longer installed
    pub executable: Option<PathBuf>,
    pub is_ready: bool,
    pub scenes: Vec<SceneId>,
}

/// @ai:intent A renderable test case with a ground-truth reference image
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    pub renderer: RendererId,
    /// Scene file, relative to the renderer's scenes folder
    pub path: PathBuf,
    /// Reference image, relative to the renderer's scenes folder
    pub reference: PathBuf,
    pub weights: NoiseWeights,
    pub regions: Vec<ImageRegion>,
    /// Sample counts with known results, sorted
    pub spps: Vec<u32>,
}

impl Scene {
    /// @ai:intent Absolute location of the reference image
    /// @ai:effects pure
    pub fn reference_path(&self, scenes_dir: &Path, renderer_name: &str) -> PathBuf {
        scenes_dir.join(renderer_name).join(&self.reference)
    }

    /// @ai:intent Record a sample count with results, keeping the list sorted and unique
    /// @ai:effects state:write
    pub fn record_spp(&mut self, spp: u32) {
        if let Err(pos) = self.spps.binary_search(&spp) {
            self.spps.insert(pos, spp);
        }
    }
}

/// @ai:intent Kind of technique under benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechniqueKind {
    Filter,
    Sampler,
}

impl TechniqueKind {
    pub const ALL: [TechniqueKind; 2] = [TechniqueKind::Filter, TechniqueKind::Sampler];

    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            TechniqueKind::Filter => "filter",
            TechniqueKind::Sampler => "sampler",
        }
    }

    /// @ai:intent Folder name used for this kind inside a result slot
    /// @ai:effects pure
    pub fn results_dir_name(&self) -> &'static str {
        match self {
            TechniqueKind::Filter => "denoisers",
            TechniqueKind::Sampler => "samplers",
        }
    }

    /// @ai:effects pure
    pub fn heading(&self) -> &'static str {
        match self {
            TechniqueKind::Filter => "DENOISERS",
            TechniqueKind::Sampler => "SAMPLERS",
        }
    }
}

impl std::fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent A denoising filter or sampler with its versions
#[derive(Debug, Clone, PartialEq)]
pub struct Technique {
    pub id: TechniqueId,
    pub kind: TechniqueKind,
    pub name: String,
    pub full_name: String,
    pub comment: String,
    pub citation: String,
    pub versions: Vec<VersionId>,
}

/// @ai:intent Build status of a technique version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionStatus {
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "not compiled")]
    NotCompiled,
}

impl VersionStatus {
    /// @ai:intent Derive the status from the presence of the executable
    /// @ai:effects fs:read
    pub fn of_executable(path: &Path) -> Self {
        if path.is_file() {
            VersionStatus::Ready
        } else {
            VersionStatus::NotCompiled
        }
    }

    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Ready => "ready",
            VersionStatus::NotCompiled => "not compiled",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent A tagged variant of a technique's executable
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueVersion {
    pub id: VersionId,
    pub technique: TechniqueId,
    pub technique_name: String,
    pub tag: String,
    pub message: String,
    pub executable: PathBuf,
    pub status: VersionStatus,
    pub results: Vec<ResultId>,
}

impl TechniqueVersion {
    /// @ai:intent Display name: the technique name, suffixed with the tag unless it is the default one
    /// @ai:effects pure
    pub fn name(&self) -> String {
        if self.is_default() {
            self.technique_name.clone()
        } else {
            format!("{}-{}", self.technique_name, self.tag)
        }
    }

    pub fn is_default(&self) -> bool {
        self.tag == DEFAULT_TAG
    }
}

/// @ai:intent Measurements of one (version, scene, sample count) triple, before registration
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub version: VersionId,
    pub scene: SceneId,
    pub spp: u32,
    pub mse: f64,
    pub psnr: f64,
    pub ssim: f64,
    pub rmse: Option<f64>,
    pub exec_time_ms: f64,
    pub rendering_time_ms: f64,
    pub aborted: bool,
}

/// @ai:intent A registered error measurement of a technique version on a scene
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueResult {
    pub id: ResultId,
    pub version: VersionId,
    pub scene: SceneId,
    pub spp: u32,
    pub mse: f64,
    pub psnr: f64,
    pub ssim: f64,
    /// Absent when the comparator predates rmse support
    pub rmse: Option<f64>,
    pub exec_time_ms: f64,
    pub rendering_time_ms: f64,
    pub aborted: bool,
}

impl TechniqueResult {
    pub(crate) fn from_record(id: ResultId, record: ResultRecord) -> Self {
        Self {
            id,
            version: record.version,
            scene: record.scene,
            spp: record.spp,
            mse: record.mse,
            psnr: record.psnr,
            ssim: record.ssim,
            rmse: record.rmse,
            exec_time_ms: record.exec_time_ms,
            rendering_time_ms: record.rendering_time_ms,
            aborted: record.aborted,
        }
    }

    /// @ai:intent Value of an error metric, `None` when the metric was not measured
    /// @ai:effects pure
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mse => Some(self.mse),
            Metric::Psnr => Some(self.psnr),
            Metric::Ssim => Some(self.ssim),
            Metric::Rmse => self.rmse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(tag: &str) -> TechniqueVersion {
        TechniqueVersion {
            id: VersionId(1),
            technique: TechniqueId(1),
            technique_name: "NFOR".to_string(),
            tag: tag.to_string(),
            message: String::new(),
            executable: PathBuf::from("NFOR"),
            status: VersionStatus::NotCompiled,
            results: vec![],
        }
    }

    #[test]
    fn test_default_version_has_no_suffix() {
        assert_eq!(version("default").name(), "NFOR");
        assert_eq!(version("v2").name(), "NFOR-v2");
    }

    #[test]
    fn test_ids_are_one_based() {
        assert_eq!(SceneId::from_index(0), SceneId(1));
        assert_eq!(SceneId(3).index(), 2);
        assert_eq!(SceneId(0).index(), usize::MAX);
    }

    #[test]
    fn test_record_spp_keeps_sorted_unique() {
        let mut scene = Scene {
            id: SceneId(1),
            name: "box".to_string(),
            renderer: RendererId(1),
            path: PathBuf::from("box.xml"),
            reference: PathBuf::from("box.exr"),
            weights: NoiseWeights::default(),
            regions: vec![],
            spps: vec![],
        };
        for spp in [16, 4, 16, 8] {
            scene.record_spp(spp);
        }
        assert_eq!(scene.spps, vec![4, 8, 16]);
    }

    #[test]
    fn test_missing_rmse_is_no_data() {
        let result = TechniqueResult::from_record(
            ResultId(1),
            ResultRecord {
                version: VersionId(1),
                scene: SceneId(1),
                spp: 4,
                mse: 0.1,
                psnr: 30.0,
                ssim: 0.9,
                rmse: None,
                exec_time_ms: 1.0,
                rendering_time_ms: 2.0,
                aborted: false,
            },
        );
        assert_eq!(result.metric(Metric::Mse), Some(0.1));
        assert_eq!(result.metric(Metric::Rmse), None);
    }

    #[test]
    fn test_status_of_missing_executable() {
        assert_eq!(
            VersionStatus::of_executable(Path::new("/nonexistent/filter")),
            VersionStatus::NotCompiled
        );
        assert_eq!(VersionStatus::NotCompiled.to_string(), "not compiled");
    }
}
