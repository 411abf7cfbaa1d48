//! @ai:module:intent Rebuild a catalog from a saved results snapshot
//! @ai:module:layer infrastructure
//! @ai:module:public_api load_snapshot
//! @ai:module:stateless true

use crate::error::{read_json, Result};
use crate::model::{
    Catalog, NewScene, NewTechnique, NewVersion, ResultRecord, SceneId, TechniqueKind,
};
use crate::report::json_report::{
    ResultDoc, SceneDoc, TechniqueDoc, FILTERS_FILE, FILTER_RESULTS_FILE, SAMPLERS_FILE,
    SAMPLER_RESULTS_FILE, SCENES_FILE,
};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// @ai:intent Load scenes, techniques, versions and results from the snapshot documents in `dir`
/// @ai:effects fs:read
pub fn load_snapshot(dir: &Path) -> Result<Catalog> {
    let scenes: BTreeMap<u32, SceneDoc> = read_json(&dir.join(SCENES_FILE))?;
    let filters: Vec<TechniqueDoc> = read_json(&dir.join(FILTERS_FILE))?;
    let samplers: Vec<TechniqueDoc> = read_json(&dir.join(SAMPLERS_FILE))?;
    let filter_results: BTreeMap<u32, ResultDoc> = read_json(&dir.join(FILTER_RESULTS_FILE))?;
    let sampler_results: BTreeMap<u32, ResultDoc> = read_json(&dir.join(SAMPLER_RESULTS_FILE))?;

    let mut catalog = Catalog::new();
    let mut scene_ids: HashMap<u32, SceneId> = HashMap::new();
    for (saved_id, doc) in scenes {
        let renderer = catalog.ensure_renderer(&doc.renderer);
        let added = catalog.add_scene(
            renderer,
            NewScene {
                name: doc.name,
                path: PathBuf::new(),
                reference: PathBuf::from(doc.reference),
                weights: doc.weights,
                regions: doc.regions.into_iter().map(|r| r.region).collect(),
            },
        );
        if let Some(id) = added {
            scene_ids.insert(saved_id, id);
        }
    }

    register(&mut catalog, TechniqueKind::Filter, filters, &filter_results, &scene_ids);
    register(&mut catalog, TechniqueKind::Sampler, samplers, &sampler_results, &scene_ids);
    catalog.record_result_spps();
    Ok(catalog)
}

fn register(
    catalog: &mut Catalog,
    kind: TechniqueKind,
    techniques: Vec<TechniqueDoc>,
    results: &BTreeMap<u32, ResultDoc>,
    scene_ids: &HashMap<u32, SceneId>,
) {
    let set = catalog.techniques_mut(kind);

    for doc in techniques {
        let technique = match set.add_technique(NewTechnique {
            name: doc.name,
            full_name: doc.full_name,
            comment: doc.comment,
            citation: doc.citation,
        }) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Skipping snapshot entry: {}", e);
                continue;
            }
        };

        for version_doc in doc.versions {
            let version = match set.add_version(
                technique,
                NewVersion {
                    tag: version_doc.tag,
                    message: version_doc.message,
                    executable: PathBuf::new(),
                    status: version_doc.status,
                },
            ) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping snapshot entry: {}", e);
                    continue;
                }
            };

            for result_id in version_doc.results_ids {
                let Some(result) = results.get(&result_id.0) else {
                    tracing::warn!("Snapshot references missing {} result {}", kind, result_id);
                    continue;
                };
                let Some(scene) = scene_ids.get(&result.scene_id) else {
                    tracing::warn!("Snapshot result {} references unknown scene {}", result_id, result.scene_id);
                    continue;
                };
                set.add_result(ResultRecord {
                    version,
                    scene: *scene,
                    spp: result.spp,
                    mse: result.mse,
                    psnr: result.psnr,
                    ssim: result.ssim,
                    rmse: result.rmse,
                    exec_time_ms: result.exec_time,
                    rendering_time_ms: result.rendering_time,
                    aborted: result.aborted,
                });
            }
        }
    }
}
