//! @ai:module:intent JSON results snapshot consumed by the results page and by the snapshot loader
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter, JsonReporterTrait, SnapshotSelection, snapshot document types
//! @ai:module:stateless true

use crate::error::{write_json, Error, Result};
use crate::model::{
    Catalog, ImageRegion, NoiseWeights, ResultId, SceneId, SceneScope, TechniqueId, TechniqueKind,
    TechniqueResult, VersionId, VersionStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const SCENES_FILE: &str = "scenes.json";
pub const FILTERS_FILE: &str = "filters.json";
pub const SAMPLERS_FILE: &str = "samplers.json";
pub const FILTER_RESULTS_FILE: &str = "results.json";
pub const SAMPLER_RESULTS_FILE: &str = "samplers_results.json";

/// @ai:intent Snapshot entry of a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    pub id: u32,
    pub name: String,
    pub renderer: String,
    #[serde(flatten)]
    pub weights: NoiseWeights,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub regions: Vec<RegionDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDoc {
    pub id: u32,
    #[serde(flatten)]
    pub region: ImageRegion,
}

/// @ai:intent Snapshot entry of a technique with its exported versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueDoc {
    pub id: TechniqueId,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub citation: String,
    pub versions: Vec<VersionDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDoc {
    pub id: VersionId,
    pub tag: String,
    #[serde(default)]
    pub message: String,
    pub status: VersionStatus,
    pub results_ids: Vec<ResultId>,
}

/// @ai:intent Snapshot entry of a result; the version key depends on the technique kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDoc {
    pub scene_id: u32,
    pub spp: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_version_id: Option<VersionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler_version_id: Option<VersionId>,
    pub exec_time: f64,
    pub rendering_time: f64,
    pub mse: f64,
    pub psnr: f64,
    pub ssim: f64,
    pub rmse: Option<f64>,
    #[serde(default)]
    pub aborted: bool,
}

impl ResultDoc {
    fn from_result(kind: TechniqueKind, result: &TechniqueResult) -> Self {
        let (filter_version_id, sampler_version_id) = match kind {
            TechniqueKind::Filter => (Some(result.version), None),
            TechniqueKind::Sampler => (None, Some(result.version)),
        };
        Self {
            scene_id: result.scene.0,
            spp: result.spp,
            filter_version_id,
            sampler_version_id,
            exec_time: result.exec_time_ms,
            rendering_time: result.rendering_time_ms,
            mse: result.mse,
            psnr: result.psnr,
            ssim: result.ssim,
            rmse: result.rmse,
            aborted: result.aborted,
        }
    }
}

/// @ai:intent What goes into a snapshot: scene scopes and the selected versions of each kind
#[derive(Debug, Clone, Default)]
pub struct SnapshotSelection {
    pub scenes: Vec<SceneScope>,
    pub filters: Vec<VersionId>,
    pub samplers: Vec<VersionId>,
}

impl SnapshotSelection {
    fn versions(&self, kind: TechniqueKind) -> &[VersionId] {
        match kind {
            TechniqueKind::Filter => &self.filters,
            TechniqueKind::Sampler => &self.samplers,
        }
    }

    fn admits(&self, scene: SceneId, spp: u32) -> bool {
        self.scenes
            .iter()
            .any(|scope| scope.scene() == scene && scope.allows(spp))
    }
}

/// @ai:intent Trait for writing the results snapshot
pub trait JsonReporterTrait {
    /// @ai:intent Write the five snapshot documents into `output_dir`
    fn generate(&self, catalog: &Catalog, selection: &SnapshotSelection, output_dir: &Path) -> Result<()>;
}

/// @ai:intent Writes results snapshots as pretty JSON
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:effects pure
    fn scene_docs(catalog: &Catalog, selection: &SnapshotSelection) -> BTreeMap<u32, SceneDoc> {
        selection
            .scenes
            .iter()
            .filter_map(|scope| catalog.scene(scope.scene()))
            .map(|scene| {
                let renderer = catalog.renderer_name(scene.id).unwrap_or_default().to_string();
                let stem = Path::new(&renderer).join(scene.reference.with_extension(""));
                let stem = stem.to_string_lossy();
                let regions = scene
                    .regions
                    .iter()
                    .enumerate()
                    .map(|(i, region)| RegionDoc {
                        id: i as u32 + 1,
                        region: region.clone(),
                    })
                    .collect();
                let doc = SceneDoc {
                    id: scene.id.0,
                    name: scene.name.clone(),
                    weights: scene.weights,
                    reference: format!("{}.png", stem),
                    thumbnail: format!("{}_thumb256.jpg", stem),
                    regions,
                    renderer,
                };
                (scene.id.0, doc)
            })
            .collect()
    }

    /// @ai:intent Techniques and results of one kind restricted to the selection
    /// @ai:effects pure
    fn technique_docs(
        catalog: &Catalog,
        kind: TechniqueKind,
        selection: &SnapshotSelection,
    ) -> (Vec<TechniqueDoc>, BTreeMap<u32, ResultDoc>) {
        let set = catalog.techniques(kind);
        let selected: HashSet<VersionId> = selection.versions(kind).iter().copied().collect();
        let mut techniques = Vec::new();
        let mut results = BTreeMap::new();

        for technique in set.techniques() {
            let mut versions = Vec::new();
            for version in technique.versions.iter().filter_map(|id| set.version(*id)) {
                if !selected.contains(&version.id) {
                    continue;
                }
                let exported: Vec<&TechniqueResult> = set
                    .results_of(version.id)
                    .filter(|r| selection.admits(r.scene, r.spp))
                    .collect();
                if exported.is_empty() {
                    continue;
                }
                for result in &exported {
                    results.insert(result.id.0, ResultDoc::from_result(kind, result));
                }
                versions.push(VersionDoc {
                    id: version.id,
                    tag: version.tag.clone(),
                    message: version.message.clone(),
                    status: version.status,
                    results_ids: exported.iter().map(|r| r.id).collect(),
                });
            }
            if versions.is_empty() {
                continue;
            }
            techniques.push(TechniqueDoc {
                id: technique.id,
                name: technique.name.clone(),
                full_name: technique.full_name.clone(),
                comment: technique.comment.clone(),
                citation: technique.citation.clone(),
                versions,
            });
        }

        (techniques, results)
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:intent Write the snapshot documents
    /// @ai:effects fs:write
    fn generate(&self, catalog: &Catalog, selection: &SnapshotSelection, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir).map_err(|e| Error::write(output_dir, e))?;

        write_json(&output_dir.join(SCENES_FILE), &Self::scene_docs(catalog, selection))?;

        let (filters, filter_results) = Self::technique_docs(catalog, TechniqueKind::Filter, selection);
        write_json(&output_dir.join(FILTERS_FILE), &filters)?;
        write_json(&output_dir.join(FILTER_RESULTS_FILE), &filter_results)?;

        let (samplers, sampler_results) = Self::technique_docs(catalog, TechniqueKind::Sampler, selection);
        write_json(&output_dir.join(SAMPLERS_FILE), &samplers)?;
        write_json(&output_dir.join(SAMPLER_RESULTS_FILE), &sampler_results)?;

        tracing::info!(
            "Results snapshot written to {} ({} filter results, {} sampler results)",
            output_dir.display(),
            filter_results.len(),
            sampler_results.len()
        );
        Ok(())
    }
}
