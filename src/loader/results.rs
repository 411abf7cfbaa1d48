//! @ai:module:intent Read technique results from the log files of a result slot
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultFiles, read_result, load_results
//! @ai:module:stateless true

use crate::error::read_json;
use crate::loader::manifest::{ErrorLog, ExecutionLog};
use crate::model::{Catalog, ResultRecord, SceneId, TechniqueKind, VersionId};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// @ai:intent File names produced for one (spp, replica) run in a result directory
#[derive(Debug, Clone, PartialEq)]
pub struct ResultFiles {
    pub dir: PathBuf,
    pub spp: u32,
    pub replica: u32,
}

impl ResultFiles {
    pub fn new(dir: impl Into<PathBuf>, spp: u32, replica: u32) -> Self {
        Self {
            dir: dir.into(),
            spp,
            replica,
        }
    }

    fn prefix(&self) -> String {
        format!("{}_{}", self.spp, self.replica)
    }

    pub fn image(&self) -> PathBuf {
        self.dir.join(format!("{}.exr", self.prefix()))
    }

    pub fn errors_log(&self) -> PathBuf {
        self.dir.join(format!("{}_errors.json", self.prefix()))
    }

    pub fn execution_log(&self) -> PathBuf {
        self.dir.join(format!("{}_log.json", self.prefix()))
    }

    /// @ai:intent Location of a relocated comparator error map, e.g. `8_0_mse_map.png`
    pub fn error_map(&self, map: &str) -> PathBuf {
        self.dir.join(format!("{}_{}", self.prefix(), map))
    }
}

/// @ai:intent Modification time of a file, `None` when it does not exist
/// @ai:effects fs:read
pub(crate) fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// @ai:intent Build a result record from the error and execution logs; `None` when absent, malformed or aborted
/// @ai:effects fs:read
pub fn read_result(files: &ResultFiles, version: VersionId, scene: SceneId) -> Option<ResultRecord> {
    let errors: ErrorLog = match read_json(&files.errors_log()) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!("No result for {}: {}", files.image().display(), e);
            return None;
        }
    };
    let execution: ExecutionLog = match read_json(&files.execution_log()) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!("No result for {}: {}", files.image().display(), e);
            return None;
        }
    };
    if execution.aborted {
        tracing::debug!("Run {} was aborted", files.image().display());
        return None;
    }

    Some(ResultRecord {
        version,
        scene,
        spp: files.spp,
        mse: errors.mse,
        psnr: errors.psnr,
        ssim: errors.ssim,
        rmse: errors.rmse,
        exec_time_ms: execution.reconstruction_time.time_ms,
        rendering_time_ms: execution.rendering_time.time_ms,
        aborted: execution.aborted,
    })
}

/// @ai:intent Sample counts with a replica-0 error log in a result directory, sorted
/// @ai:effects fs:read
fn logged_sample_counts(dir: &Path) -> Vec<u32> {
    let Ok(read_dir) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut spps: Vec<u32> = read_dir
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.strip_suffix("_0_errors.json")
                .and_then(|spp| spp.parse().ok())
                .filter(|spp: &u32| *spp > 0)
        })
        .collect();
    spps.sort_unstable();
    spps
}

/// @ai:intent Register the results of one kind found under `<root>/<technique>/<tag>/<scene>`
/// @ai:effects fs:read
pub fn load_results(catalog: &mut Catalog, kind: TechniqueKind, root: &Path) -> usize {
    let versions: Vec<(VersionId, PathBuf)> = catalog
        .techniques(kind)
        .versions()
        .iter()
        .map(|v| (v.id, root.join(&v.technique_name).join(&v.tag)))
        .filter(|(_, dir)| dir.is_dir())
        .collect();
    let scenes: Vec<(SceneId, String)> = catalog
        .scenes()
        .iter()
        .map(|s| (s.id, s.name.clone()))
        .collect();

    let mut loaded = 0;
    for (version, version_dir) in versions {
        for (scene, scene_name) in &scenes {
            let dir = version_dir.join(scene_name);
            for spp in logged_sample_counts(&dir) {
                let files = ResultFiles::new(&dir, spp, 0);
                let Some(image_time) = modified(&files.image()) else {
                    continue;
                };
                let log_time = modified(&files.errors_log());
                if log_time.map_or(true, |log| image_time > log) {
                    tracing::debug!("Skipping outdated result {}", files.image().display());
                    continue;
                }
                if let Some(record) = read_result(&files, version, *scene) {
                    if catalog.techniques_mut(kind).add_result(record).is_some() {
                        loaded += 1;
                    }
                }
            }
        }
    }

    catalog.record_result_spps();
    tracing::debug!("Loaded {} {} results from {}", loaded, kind, root.display());
    loaded
}
