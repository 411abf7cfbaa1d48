//! @ai:module:intent Build the catalog from renderer, scene and technique metadata on disk
//! @ai:module:layer infrastructure
//! @ai:module:public_api load_renderers, load_scenes, scan_scenes, load_techniques
//! @ai:module:stateless true

use crate::error::{read_json, write_json, Error, Result};
use crate::loader::manifest::{
    RendererManifest, SceneDescriptor, ScenesCacheEntry, TechniqueManifest,
};
use crate::model::{
    Catalog, NewScene, NewTechnique, NewVersion, TechniqueKind, VersionStatus, DEFAULT_TAG,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MANIFEST_FILE: &str = "info.json";
const SINGLE_SCENE_FILE: &str = "fbksd-scene.json";
const MULTI_SCENE_FILE: &str = "fbksd-scenes.json";
/// Helper folder shipped next to the samplers; not a technique.
const SAMPLE_WRITER_DIR: &str = "SampleWriter";

/// @ai:intent Visible subdirectories of a directory, sorted by name
/// @ai:effects fs:read
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// @ai:intent Register every renderer with a readable `info.json` manifest
/// @ai:effects fs:read
pub fn load_renderers(catalog: &mut Catalog, renderers_dir: &Path) {
    for dir in subdirectories(renderers_dir) {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            continue;
        }
        match read_json::<RendererManifest>(&manifest_path) {
            Ok(manifest) => {
                let executable = dir.join(&manifest.exec);
                let is_ready = executable.is_file();
                catalog.add_renderer(&manifest.name, executable, is_ready);
            }
            Err(e) => {
                tracing::warn!("Skipping renderer manifest {}: {}", manifest_path.display(), e);
            }
        }
    }
}

/// @ai:intent Load renderers, then the scenes listed in the scenes cache
/// @ai:effects fs:read
pub fn load_scenes(catalog: &mut Catalog, scenes_cache: &Path, renderers_dir: &Path) -> Result<()> {
    load_renderers(catalog, renderers_dir);

    if !scenes_cache.is_file() {
        tracing::debug!("No scenes cache at {}", scenes_cache.display());
        return Ok(());
    }
    let entries: Vec<ScenesCacheEntry> = read_json(scenes_cache)?;

    for entry in entries {
        let renderer = catalog.ensure_renderer(&entry.renderer);
        for scene in entry.scenes {
            catalog.add_scene(
                renderer,
                NewScene {
                    name: scene.name,
                    path: PathBuf::from(scene.path),
                    reference: PathBuf::from(scene.ref_img),
                    weights: scene.weights,
                    regions: scene.regions,
                },
            );
        }
    }
    Ok(())
}

/// @ai:intent Read scene descriptors below a renderer folder, rebasing their paths on that folder
/// @ai:effects fs:read
fn scan_renderer_scenes(renderer_dir: &Path) -> Vec<SceneDescriptor> {
    let mut scenes = Vec::new();

    for file_name in [SINGLE_SCENE_FILE, MULTI_SCENE_FILE] {
        let files = WalkDir::new(renderer_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == file_name);

        for file in files {
            let parsed = if file_name == SINGLE_SCENE_FILE {
                read_json::<SceneDescriptor>(file.path()).map(|s| vec![s])
            } else {
                read_json::<Vec<SceneDescriptor>>(file.path())
            };
            let descriptors = match parsed {
                Ok(descriptors) => descriptors,
                Err(e) => {
                    tracing::warn!("Skipping scene descriptor {}: {}", file.path().display(), e);
                    continue;
                }
            };

            let base = file
                .path()
                .parent()
                .and_then(|p| p.strip_prefix(renderer_dir).ok())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            for mut scene in descriptors {
                scene.path = base.join(&scene.path).to_string_lossy().into_owned();
                scene.ref_img = base.join(&scene.ref_img).to_string_lossy().into_owned();
                scenes.push(scene);
            }
        }
    }

    scenes
}

/// @ai:intent Crawl the scenes directory and rewrite the scenes cache
/// @ai:effects fs:read, fs:write
pub fn scan_scenes(scenes_dir: &Path, cache_name: &str) -> Result<Vec<ScenesCacheEntry>> {
    if !scenes_dir.is_dir() {
        return Err(Error::read(
            scenes_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "scenes folder does not exist"),
        ));
    }

    let mut cache = Vec::new();
    for renderer_dir in subdirectories(scenes_dir) {
        let scenes = scan_renderer_scenes(&renderer_dir);
        if scenes.is_empty() {
            continue;
        }
        let renderer = renderer_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!("Found {} scenes for renderer {}", scenes.len(), renderer);
        cache.push(ScenesCacheEntry { renderer, scenes });
    }

    write_json(&scenes_dir.join(cache_name), &cache)?;
    Ok(cache)
}

/// @ai:intent Register the techniques of one kind from their `info.json` manifests
/// @ai:effects fs:read
pub fn load_techniques(catalog: &mut Catalog, techniques_dir: &Path, kind: TechniqueKind) {
    let set = catalog.techniques_mut(kind);

    for dir in subdirectories(techniques_dir) {
        let folder = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if folder == SAMPLE_WRITER_DIR {
            continue;
        }
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            tracing::warn!("{} {} has no {} file", kind, folder, MANIFEST_FILE);
            continue;
        }
        let manifest: TechniqueManifest = match read_json(&manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Skipping {} manifest {}: {}", kind, manifest_path.display(), e);
                continue;
            }
        };

        let versions = match &manifest.versions {
            Some(versions) => versions
                .iter()
                .map(|v| (v.name.clone(), v.comment.clone(), dir.join(&v.executable)))
                .collect(),
            None => {
                let message = if manifest.comment.is_empty() {
                    "Default version".to_string()
                } else {
                    manifest.comment.clone()
                };
                vec![(DEFAULT_TAG.to_string(), message, dir.join(&manifest.short_name))]
            }
        };

        let technique = match set.add_technique(NewTechnique {
            name: manifest.short_name,
            full_name: manifest.full_name,
            comment: manifest.comment,
            citation: manifest.citation,
        }) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", manifest_path.display(), e);
                continue;
            }
        };

        for (tag, message, executable) in versions {
            let status = VersionStatus::of_executable(&executable);
            if let Err(e) = set.add_version(
                technique,
                NewVersion {
                    tag,
                    message,
                    executable,
                    status,
                },
            ) {
                tracing::warn!("{}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_technique_without_versions_gets_default() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("LBF/info.json"),
            r#"{"short_name": "LBF", "full_name": "Learning Based Filter", "comment": "", "citation": "K15"}"#,
        );
        write(&temp.path().join("LBF/LBF"), "#!/bin/sh\n");
        write(&temp.path().join("SampleWriter/info.json"), r#"{"short_name": "SW"}"#);
        std::fs::create_dir_all(temp.path().join("Broken")).unwrap();

        let mut catalog = Catalog::new();
        load_techniques(&mut catalog, temp.path(), TechniqueKind::Filter);

        assert_eq!(catalog.filters.techniques().len(), 1);
        let version = catalog.filters.version_by_tag("LBF", "default").unwrap();
        assert_eq!(version.message, "Default version");
        assert_eq!(version.status, VersionStatus::Ready);
        assert_eq!(version.executable, temp.path().join("LBF/LBF"));
        assert_eq!(version.name(), "LBF");
    }

    #[test]
    fn test_duplicate_version_tag_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("NFOR/info.json"),
            r#"{"short_name": "NFOR", "full_name": "", "comment": "c", "citation": "",
                "versions": [
                    {"name": "v1", "comment": "first", "executable": "build/nfor"},
                    {"name": "v1", "comment": "again", "executable": "build/nfor2"},
                    {"name": "v2", "comment": "second", "executable": "build/nfor3"}
                ]}"#,
        );

        let mut catalog = Catalog::new();
        load_techniques(&mut catalog, temp.path(), TechniqueKind::Sampler);

        let technique = catalog.samplers.technique_by_name("NFOR").unwrap();
        assert_eq!(technique.versions.len(), 2);
        let v1 = catalog.samplers.version_by_tag("NFOR", "v1").unwrap();
        assert_eq!(v1.message, "first");
        assert_eq!(v1.status, VersionStatus::NotCompiled);
    }

    #[test]
    fn test_malformed_manifest_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("Bad/info.json"), "{ not json");
        write(
            &temp.path().join("Good/info.json"),
            r#"{"short_name": "Good", "full_name": "", "comment": "ok", "citation": ""}"#,
        );

        let mut catalog = Catalog::new();
        load_techniques(&mut catalog, temp.path(), TechniqueKind::Filter);
        let names: Vec<_> = catalog.filters.techniques().iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["Good"]);
        assert_eq!(catalog.filters.version_by_tag("Good", "default").unwrap().message, "ok");
    }

    #[test]
    fn test_scan_then_load_scenes() {
        let temp = TempDir::new().unwrap();
        let scenes_dir = temp.path().join("scenes");
        let renderers_dir = temp.path().join("renderers");
        write(
            &scenes_dir.join("pbrt/box/fbksd-scene.json"),
            r#"{"name": "box", "path": "box.pbrt", "ref-img": "box.exr", "dof_w": 0.5}"#,
        );
        write(
            &scenes_dir.join("mitsuba/set/fbksd-scenes.json"),
            r#"[{"name": "a", "path": "a.xml", "ref-img": "ref/a.exr"},
                {"name": "b", "path": "b.xml", "ref-img": "ref/b.exr"}]"#,
        );
        write(
            &renderers_dir.join("pbrt/info.json"),
            r#"{"name": "pbrt", "exec": "bin/pbrt"}"#,
        );

        let cache = scan_scenes(&scenes_dir, ".cache.json").unwrap();
        assert_eq!(cache.len(), 2);

        let mut catalog = Catalog::new();
        load_scenes(&mut catalog, &scenes_dir.join(".cache.json"), &renderers_dir).unwrap();

        let box_scene = catalog.resolve_scene("pbrt", "box").unwrap();
        assert_eq!(box_scene.path, PathBuf::from("box/box.pbrt"));
        assert_eq!(box_scene.reference, PathBuf::from("box/box.exr"));
        assert_eq!(box_scene.weights.defocus, 0.5);
        assert_eq!(
            catalog.resolve_scene("mitsuba", "b").unwrap().reference,
            PathBuf::from("set/ref/b.exr")
        );

        let pbrt = catalog.renderer_by_name("pbrt").unwrap();
        assert!(!pbrt.is_ready);
        assert_eq!(pbrt.executable, Some(renderers_dir.join("pbrt/bin/pbrt")));
        let mitsuba = catalog.renderer_by_name("mitsuba").unwrap();
        assert!(mitsuba.executable.is_none());
        assert_eq!(mitsuba.scenes.len(), 2);
    }

    #[test]
    fn test_missing_cache_is_empty_and_invalid_cache_fails() {
        let temp = TempDir::new().unwrap();
        let mut catalog = Catalog::new();
        load_scenes(&mut catalog, &temp.path().join("none.json"), temp.path()).unwrap();
        assert!(catalog.scenes().is_empty());

        let cache = temp.path().join("cache.json");
        write(&cache, "[{");
        let err = load_scenes(&mut catalog, &cache, temp.path()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
