//! @ai:module:intent Resolve a configuration into the run document and the list of benchmark jobs
//! @ai:module:layer domain
//! @ai:module:public_api run_document, plan_jobs, RunJob
//! @ai:module:stateless true

use crate::configuration::{ConfigDocument, Configuration};
use crate::model::{Catalog, TechniqueKind, VersionStatus};
use std::path::{Path, PathBuf};

/// @ai:intent One invocation of the benchmark executable
#[derive(Debug, Clone, PartialEq)]
pub struct RunJob {
    pub kind: TechniqueKind,
    /// Display name of the version
    pub name: String,
    pub executable: PathBuf,
    /// `<slot>/<kind dir>/<technique>/<tag>`
    pub output: PathBuf,
}

/// @ai:intent Configuration document with absolute renderer executables and scene files
/// @ai:effects pure
pub fn run_document(config: &Configuration, catalog: &Catalog, scenes_dir: &Path) -> ConfigDocument {
    let mut document = config.to_document(catalog);

    document.renderers.retain_mut(|entry| {
        let Some(renderer) = catalog.renderer_by_name(&entry.name) else {
            return false;
        };
        let Some(executable) = renderer.executable.as_ref().filter(|_| renderer.is_ready) else {
            tracing::warn!("Renderer '{}' is not ready, its scenes are not run", entry.name);
            return false;
        };
        entry.path = Some(executable.display().to_string());

        for scene_entry in &mut entry.scenes {
            if let Some(scene) = catalog.resolve_scene(&renderer.name, &scene_entry.name) {
                let path = scenes_dir.join(&renderer.name).join(&scene.path);
                scene_entry.path = Some(path.display().to_string());
            }
        }
        true
    });

    document
}

/// @ai:intent Jobs for every selected version with a built executable, filters first
/// @ai:effects pure
pub fn plan_jobs(config: &Configuration, catalog: &Catalog, slot_dir: &Path) -> Vec<RunJob> {
    let mut jobs = Vec::new();
    for kind in TechniqueKind::ALL {
        let set = catalog.techniques(kind);
        for version in config.versions(kind).iter().filter_map(|id| set.version(*id)) {
            if version.status != VersionStatus::Ready {
                tracing::warn!("Skipping {} {}: {}", kind, version.name(), version.status);
                continue;
            }
            jobs.push(RunJob {
                kind,
                name: version.name(),
                executable: version.executable.clone(),
                output: slot_dir
                    .join(kind.results_dir_name())
                    .join(&version.technique_name)
                    .join(&version.tag),
            });
        }
    }
    jobs
}
