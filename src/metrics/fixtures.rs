//! Catalog builders shared by the metrics tests.

use crate::model::{
    Catalog, NewScene, NewTechnique, NewVersion, ResultRecord, SceneId, TechniqueKind, VersionId,
    VersionStatus,
};
use std::path::PathBuf;

pub(crate) fn catalog_with_scenes(names: &[&str]) -> (Catalog, Vec<SceneId>) {
    let mut catalog = Catalog::new();
    let renderer = catalog.ensure_renderer("pbrt");
    let scenes = names
        .iter()
        .filter_map(|name| {
            catalog.add_scene(
                renderer,
                NewScene {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
        })
        .collect();
    (catalog, scenes)
}

pub(crate) fn add_filter(catalog: &mut Catalog, name: &str) -> VersionId {
    let set = catalog.techniques_mut(TechniqueKind::Filter);
    let technique = set
        .add_technique(NewTechnique {
            name: name.to_string(),
            ..Default::default()
        })
        .unwrap();
    set.add_version(
        technique,
        NewVersion {
            tag: "default".to_string(),
            message: String::new(),
            executable: PathBuf::from(name),
            status: VersionStatus::Ready,
        },
    )
    .unwrap()
}

pub(crate) fn add_mse(catalog: &mut Catalog, version: VersionId, scene: SceneId, spp: u32, mse: f64) {
    catalog.filters.add_result(ResultRecord {
        version,
        scene,
        spp,
        mse,
        psnr: 10.0 * (1.0 / mse).log10(),
        ssim: 1.0 - mse,
        rmse: None,
        exec_time_ms: 1.0,
        rendering_time_ms: 1.0,
        aborted: false,
    });
}
