//! @ai:module:intent Benchmark configurations: which scenes, sample counts and technique versions to run
//! @ai:module:layer domain
//! @ai:module:public_api Configuration, ConfigScene, ConfigWarning
//! @ai:module:stateless false

use crate::configuration::document::{ConfigDocument, RendererEntry, SceneEntry, TechniqueEntry};
use crate::error::{read_json, write_json, Result};
use crate::model::{Catalog, SceneId, SceneScope, TechniqueKind, VersionId, DEFAULT_TAG};
use std::path::Path;

/// @ai:intent A scene selected by a configuration with its sample counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigScene {
    pub scene: SceneId,
    /// Sorted, without duplicates
    pub spps: Vec<u32>,
}

impl ConfigScene {
    /// @ai:effects pure
    pub fn scope(&self) -> SceneScope {
        SceneScope::scoped(self.scene, self.spps.clone())
    }
}

/// @ai:intent A configuration entry that no longer matches the catalog and was dropped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigWarning {
    #[error("scene '{scene}' of renderer '{renderer}' not found")]
    UnknownScene { renderer: String, scene: String },
    #[error("{kind} '{name}' not found")]
    UnknownTechnique { kind: TechniqueKind, name: String },
    #[error("{kind} '{technique}' has no version '{tag}'")]
    UnknownVersion {
        kind: TechniqueKind,
        technique: String,
        tag: String,
    },
}

/// @ai:intent Named selection of scenes × sample counts and technique versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub name: String,
    scenes: Vec<ConfigScene>,
    filters: Vec<VersionId>,
    samplers: Vec<VersionId>,
}

fn normalized(spps: &[u32]) -> Vec<u32> {
    let mut spps = spps.to_vec();
    spps.sort_unstable();
    spps.dedup();
    spps
}

impl Configuration {
    /// @ai:intent Create a configuration giving every scene the same sample counts
    /// @ai:effects pure
    pub fn new(
        name: impl Into<String>,
        scenes: &[SceneId],
        filters: &[VersionId],
        samplers: &[VersionId],
        spps: &[u32],
    ) -> Self {
        let mut config = Self {
            name: name.into(),
            scenes: Vec::new(),
            filters: Vec::new(),
            samplers: Vec::new(),
        };
        for scene in scenes {
            config.add_scene(*scene, spps);
        }
        for version in filters {
            config.add_version(TechniqueKind::Filter, *version);
        }
        for version in samplers {
            config.add_version(TechniqueKind::Sampler, *version);
        }
        config
    }

    pub fn scenes(&self) -> &[ConfigScene] {
        &self.scenes
    }

    pub fn versions(&self, kind: TechniqueKind) -> &[VersionId] {
        match kind {
            TechniqueKind::Filter => &self.filters,
            TechniqueKind::Sampler => &self.samplers,
        }
    }

    fn versions_mut(&mut self, kind: TechniqueKind) -> &mut Vec<VersionId> {
        match kind {
            TechniqueKind::Filter => &mut self.filters,
            TechniqueKind::Sampler => &mut self.samplers,
        }
    }

    /// @ai:intent Scene scopes restricting each scene to its configured sample counts
    /// @ai:effects pure
    pub fn scopes(&self) -> Vec<SceneScope> {
        self.scenes.iter().map(ConfigScene::scope).collect()
    }

    pub fn contains_scene(&self, scene: SceneId) -> bool {
        self.scenes.iter().any(|s| s.scene == scene)
    }

    /// @ai:intent Add a scene; no-op when the scene is already selected
    /// @ai:effects state:write
    pub fn add_scene(&mut self, scene: SceneId, spps: &[u32]) -> bool {
        if self.contains_scene(scene) {
            return false;
        }
        self.scenes.push(ConfigScene {
            scene,
            spps: normalized(spps),
        });
        true
    }

    /// @ai:effects state:write
    pub fn remove_scene(&mut self, scene: SceneId) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| s.scene != scene);
        self.scenes.len() != before
    }

    /// @ai:intent Select a version; versions of the same technique may coexist
    /// @ai:effects state:write
    pub fn add_version(&mut self, kind: TechniqueKind, version: VersionId) -> bool {
        let versions = self.versions_mut(kind);
        if versions.contains(&version) {
            return false;
        }
        versions.push(version);
        true
    }

    /// @ai:effects state:write
    pub fn remove_version(&mut self, kind: TechniqueKind, version: VersionId) -> bool {
        let versions = self.versions_mut(kind);
        let before = versions.len();
        versions.retain(|v| *v != version);
        versions.len() != before
    }

    fn targets<'a>(&'a mut self, scenes: Option<&'a [SceneId]>) -> impl Iterator<Item = &'a mut ConfigScene> {
        self.scenes
            .iter_mut()
            .filter(move |s| scenes.map_or(true, |ids| ids.contains(&s.scene)))
    }

    /// @ai:intent Add sample counts to every scene, or only to the given ones
    /// @ai:effects state:write
    pub fn add_sample_counts(&mut self, spps: &[u32], scenes: Option<&[SceneId]>) {
        for scene in self.targets(scenes) {
            scene.spps.extend_from_slice(spps);
            scene.spps = normalized(&scene.spps);
        }
    }

    /// @ai:intent Remove sample counts from every scene, or only from the given ones
    /// @ai:effects state:write
    pub fn remove_sample_counts(&mut self, spps: &[u32], scenes: Option<&[SceneId]>) {
        for scene in self.targets(scenes) {
            scene.spps.retain(|spp| !spps.contains(spp));
        }
    }

    /// @ai:intent Persistable document, grouped by renderer and by technique in first-appearance order
    /// @ai:effects pure
    pub fn to_document(&self, catalog: &Catalog) -> ConfigDocument {
        let mut renderers: Vec<RendererEntry> = Vec::new();
        for config_scene in &self.scenes {
            let Some(scene) = catalog.scene(config_scene.scene) else {
                continue;
            };
            let renderer = catalog.renderer_name(scene.id).unwrap_or_default();
            let entry = SceneEntry {
                name: scene.name.clone(),
                path: None,
                spps: config_scene.spps.clone(),
            };
            match renderers.iter_mut().find(|r| r.name == renderer) {
                Some(group) => group.scenes.push(entry),
                None => renderers.push(RendererEntry {
                    name: renderer.to_string(),
                    path: None,
                    scenes: vec![entry],
                }),
            }
        }

        ConfigDocument {
            renderers,
            filters: technique_entries(catalog, TechniqueKind::Filter, &self.filters),
            samplers: technique_entries(catalog, TechniqueKind::Sampler, &self.samplers),
        }
    }

    /// @ai:intent Resolve a document against the catalog, dropping and reporting entries that do not match
    /// @ai:effects pure
    pub fn from_document(
        name: impl Into<String>,
        document: &ConfigDocument,
        catalog: &Catalog,
    ) -> (Self, Vec<ConfigWarning>) {
        let mut config = Self::new(name, &[], &[], &[], &[]);
        let mut warnings = Vec::new();

        for renderer in &document.renderers {
            for entry in &renderer.scenes {
                match catalog.resolve_scene(&renderer.name, &entry.name) {
                    Some(scene) => {
                        config.add_scene(scene.id, &entry.spps);
                    }
                    None => warnings.push(ConfigWarning::UnknownScene {
                        renderer: renderer.name.clone(),
                        scene: entry.name.clone(),
                    }),
                }
            }
        }

        for kind in TechniqueKind::ALL {
            let entries = match kind {
                TechniqueKind::Filter => &document.filters,
                TechniqueKind::Sampler => &document.samplers,
            };
            let set = catalog.techniques(kind);
            for entry in entries {
                if set.technique_by_name(&entry.name).is_none() {
                    warnings.push(ConfigWarning::UnknownTechnique {
                        kind,
                        name: entry.name.clone(),
                    });
                    continue;
                }
                let default_tags = [DEFAULT_TAG.to_string()];
                let tags = entry.versions.as_deref().unwrap_or(&default_tags);
                for tag in tags {
                    match set.version_by_tag(&entry.name, tag) {
                        Some(version) => {
                            config.add_version(kind, version.id);
                        }
                        None => warnings.push(ConfigWarning::UnknownVersion {
                            kind,
                            technique: entry.name.clone(),
                            tag: tag.clone(),
                        }),
                    }
                }
            }
        }

        for warning in &warnings {
            tracing::warn!("Configuration '{}': {}", config.name, warning);
        }
        (config, warnings)
    }

    /// @ai:intent Load a configuration file; its name is the file stem
    /// @ai:effects fs:read
    pub fn load(path: &Path, catalog: &Catalog) -> Result<(Self, Vec<ConfigWarning>)> {
        let document: ConfigDocument = read_json(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_document(name, &document, catalog))
    }

    /// @ai:effects fs:write
    pub fn save(&self, path: &Path, catalog: &Catalog) -> Result<()> {
        write_json(path, &self.to_document(catalog))
    }
}

fn technique_entries(catalog: &Catalog, kind: TechniqueKind, versions: &[VersionId]) -> Vec<TechniqueEntry> {
    let set = catalog.techniques(kind);
    let mut entries: Vec<TechniqueEntry> = Vec::new();
    for version in versions.iter().filter_map(|id| set.version(*id)) {
        match entries.iter_mut().find(|e| e.name == version.technique_name) {
            Some(entry) => entry
                .versions
                .get_or_insert_with(Vec::new)
                .push(version.tag.clone()),
            None => entries.push(TechniqueEntry {
                name: version.technique_name.clone(),
                versions: Some(vec![version.tag.clone()]),
            }),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewScene, NewTechnique, NewVersion, VersionStatus};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        catalog: Catalog,
        scenes: Vec<SceneId>,
        lbf: VersionId,
        lbf_v2: VersionId,
        mdas: VersionId,
    }

    fn version(tag: &str) -> NewVersion {
        NewVersion {
            tag: tag.to_string(),
            message: String::new(),
            executable: PathBuf::from("x"),
            status: VersionStatus::NotCompiled,
        }
    }

    fn fixture() -> Fixture {
        let mut catalog = Catalog::new();
        let pbrt = catalog.ensure_renderer("pbrt");
        let mitsuba = catalog.ensure_renderer("mitsuba");
        let scenes = vec![
            catalog.add_scene(pbrt, NewScene { name: "box".to_string(), ..Default::default() }).unwrap(),
            catalog.add_scene(mitsuba, NewScene { name: "sponza".to_string(), ..Default::default() }).unwrap(),
            catalog.add_scene(pbrt, NewScene { name: "car".to_string(), ..Default::default() }).unwrap(),
        ];
        let t = catalog
            .filters
            .add_technique(NewTechnique { name: "LBF".to_string(), ..Default::default() })
            .unwrap();
        let lbf = catalog.filters.add_version(t, version("default")).unwrap();
        let lbf_v2 = catalog.filters.add_version(t, version("v2")).unwrap();
        let s = catalog
            .samplers
            .add_technique(NewTechnique { name: "MDAS".to_string(), ..Default::default() })
            .unwrap();
        let mdas = catalog.samplers.add_version(s, version("default")).unwrap();
        Fixture { catalog, scenes, lbf, lbf_v2, mdas }
    }

    #[test]
    fn test_new_normalizes_and_collapses() {
        let f = fixture();
        let config = Configuration::new(
            "c",
            &[f.scenes[0], f.scenes[0]],
            &[f.lbf, f.lbf_v2, f.lbf],
            &[],
            &[16, 4, 4],
        );
        assert_eq!(config.scenes().len(), 1);
        assert_eq!(config.scenes()[0].spps, vec![4, 16]);
        assert_eq!(config.versions(TechniqueKind::Filter), &[f.lbf, f.lbf_v2]);
    }

    #[test]
    fn test_mutations_are_idempotent() {
        let f = fixture();
        let mut config = Configuration::new("c", &[f.scenes[0]], &[], &[], &[4]);
        assert!(!config.add_scene(f.scenes[0], &[8]));
        assert!(config.add_scene(f.scenes[1], &[8]));
        assert!(config.remove_scene(f.scenes[0]));
        assert!(!config.remove_scene(f.scenes[0]));
        assert!(config.add_version(TechniqueKind::Sampler, f.mdas));
        assert!(!config.add_version(TechniqueKind::Sampler, f.mdas));
        assert!(config.remove_version(TechniqueKind::Sampler, f.mdas));
        assert!(config.versions(TechniqueKind::Sampler).is_empty());
    }

    #[test]
    fn test_sample_counts_global_and_scoped() {
        let f = fixture();
        let mut config = Configuration::new("c", &f.scenes[..2], &[], &[], &[4, 8]);
        config.add_sample_counts(&[32, 2, 8], None);
        assert_eq!(config.scenes()[0].spps, vec![2, 4, 8, 32]);

        config.remove_sample_counts(&[4, 32], Some(&[f.scenes[1]]));
        assert_eq!(config.scenes()[0].spps, vec![2, 4, 8, 32]);
        assert_eq!(config.scenes()[1].spps, vec![2, 8]);
        assert!(config.scopes()[1].allows(2));
        assert!(!config.scopes()[1].allows(4));
    }

    #[test]
    fn test_document_groups_by_renderer_and_technique() {
        let f = fixture();
        let config = Configuration::new("c", &f.scenes, &[f.lbf, f.lbf_v2], &[f.mdas], &[4]);
        let doc = config.to_document(&f.catalog);

        assert_eq!(doc.renderers.len(), 2);
        assert_eq!(doc.renderers[0].name, "pbrt");
        let pbrt_scenes: Vec<_> = doc.renderers[0].scenes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(pbrt_scenes, vec!["box", "car"]);
        assert_eq!(doc.filters.len(), 1);
        assert_eq!(doc.filters[0].versions, Some(vec!["default".to_string(), "v2".to_string()]));
        assert_eq!(doc.samplers[0].name, "MDAS");
    }

    #[test]
    fn test_from_document_reports_drift() {
        let f = fixture();
        let doc: ConfigDocument = serde_json::from_str(
            r#"{"renderers": [{"name": "pbrt", "scenes": [{"name": "box", "spps": [8, 4, 8]},
                                                      {"name": "gone", "spps": [4]}]}],
                "filters": [{"name": "LBF"}, {"name": "LBF", "versions": ["v2", "v9"]}, {"name": "NFOR"}],
                "samplers": []}"#,
        )
        .unwrap();

        let (config, warnings) = Configuration::from_document("c", &doc, &f.catalog);

        assert_eq!(config.scenes(), &[ConfigScene { scene: f.scenes[0], spps: vec![4, 8] }]);
        assert_eq!(config.versions(TechniqueKind::Filter), &[f.lbf, f.lbf_v2]);
        assert_eq!(
            warnings,
            vec![
                ConfigWarning::UnknownScene { renderer: "pbrt".to_string(), scene: "gone".to_string() },
                ConfigWarning::UnknownVersion {
                    kind: TechniqueKind::Filter,
                    technique: "LBF".to_string(),
                    tag: "v9".to_string()
                },
                ConfigWarning::UnknownTechnique { kind: TechniqueKind::Filter, name: "NFOR".to_string() },
            ]
        );
    }

    #[test]
    fn test_save_load_round_trip() {
        let f = fixture();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mine.json");
        let mut config = Configuration::new("mine", &f.scenes, &[f.lbf_v2], &[f.mdas], &[2, 4]);
        config.add_sample_counts(&[64], Some(&[f.scenes[2]]));
        config.save(&path, &f.catalog).unwrap();

        let (loaded, warnings) = Configuration::load(&path, &f.catalog).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(loaded.name, "mine");
        assert_eq!(loaded.versions(TechniqueKind::Filter), config.versions(TechniqueKind::Filter));
        assert_eq!(loaded.versions(TechniqueKind::Sampler), config.versions(TechniqueKind::Sampler));
        let mut expected = config.scenes().to_vec();
        let mut actual = loaded.scenes().to_vec();
        expected.sort_by_key(|s| s.scene);
        actual.sort_by_key(|s| s.scene);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let f = fixture();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{\"renderers\": [").unwrap();
        assert!(Configuration::load(&path, &f.catalog).is_err());
    }
}
