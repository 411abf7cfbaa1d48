//! @ai:module:intent Registries assigning identities to catalog entities within one load cycle
//! @ai:module:layer domain
//! @ai:module:public_api Catalog, TechniqueSet, NewScene, NewTechnique, NewVersion
//! @ai:module:stateless false

use crate::error::{Error, Result};
use crate::model::entities::{
    ImageRegion, NoiseWeights, Renderer, RendererId, ResultId, ResultRecord, Scene, SceneId,
    Technique, TechniqueId, TechniqueKind, TechniqueResult, TechniqueVersion, VersionId,
    VersionStatus,
};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// @ai:intent Scene attributes supplied by a loader before registration
#[derive(Debug, Clone, Default)]
pub struct NewScene {
    pub name: String,
    pub path: PathBuf,
    pub reference: PathBuf,
    pub weights: NoiseWeights,
    pub regions: Vec<ImageRegion>,
}

/// @ai:intent Technique attributes supplied by a loader before registration
#[derive(Debug, Clone, Default)]
pub struct NewTechnique {
    pub name: String,
    pub full_name: String,
    pub comment: String,
    pub citation: String,
}

/// @ai:intent Version attributes supplied by a loader before registration
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub tag: String,
    pub message: String,
    pub executable: PathBuf,
    pub status: VersionStatus,
}

/// @ai:intent Registry of renderers and scenes plus one technique set per kind
#[derive(Debug, Clone)]
pub struct Catalog {
    renderers: Vec<Renderer>,
    renderer_names: HashMap<String, RendererId>,
    scenes: Vec<Scene>,
    scene_names: HashMap<String, SceneId>,
    pub filters: TechniqueSet,
    pub samplers: TechniqueSet,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// @ai:intent Create an empty catalog; ids start at 1 for every entity kind
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
            renderer_names: HashMap::new(),
            scenes: Vec::new(),
            scene_names: HashMap::new(),
            filters: TechniqueSet::new(TechniqueKind::Filter),
            samplers: TechniqueSet::new(TechniqueKind::Sampler),
        }
    }

    /// @ai:intent Register an installed renderer, or update the existing entry with the same name
    /// @ai:effects state:write
    pub fn add_renderer(&mut self, name: &str, executable: PathBuf, is_ready: bool) -> RendererId {
        let id = self.ensure_renderer(name);
        let renderer = &mut self.renderers[id.index()];
        renderer.executable = Some(executable);
        renderer.is_ready = is_ready;
        id
    }

    /// @ai:intent Look up a renderer by name, creating a placeholder when it is not installed
    /// @ai:effects state:write
    pub fn ensure_renderer(&mut self, name: &str) -> RendererId {
        if let Some(id) = self.renderer_names.get(name) {
            return *id;
        }
        let id = RendererId::from_index(self.renderers.len());
        self.renderers.push(Renderer {
            id,
            name: name.to_string(),
            executable: None,
            is_ready: false,
            scenes: Vec::new(),
        });
        self.renderer_names.insert(name.to_string(), id);
        id
    }

    /// @ai:intent Register a scene under a renderer; `None` when the renderer already has a scene with that name
    /// @ai:effects state:write
    pub fn add_scene(&mut self, renderer: RendererId, scene: NewScene) -> Option<SceneId> {
        let owner = self.renderers.get(renderer.index())?;
        let clash = owner
            .scenes
            .iter()
            .any(|sid| self.scenes[sid.index()].name == scene.name);
        if clash {
            tracing::warn!(
                "Duplicate scene '{}' in renderer '{}' ignored",
                scene.name,
                owner.name
            );
            return None;
        }

        let id = SceneId::from_index(self.scenes.len());
        self.scene_names.entry(scene.name.clone()).or_insert(id);
        self.scenes.push(Scene {
            id,
            name: scene.name,
            renderer,
            path: scene.path,
            reference: scene.reference,
            weights: scene.weights,
            regions: scene.regions,
            spps: Vec::new(),
        });
        self.renderers[renderer.index()].scenes.push(id);
        Some(id)
    }

    pub fn renderer(&self, id: RendererId) -> Option<&Renderer> {
        self.renderers.get(id.index())
    }

    pub fn renderer_by_name(&self, name: &str) -> Option<&Renderer> {
        self.renderer_names.get(name).and_then(|id| self.renderer(*id))
    }

    pub fn renderers(&self) -> &[Renderer] {
        &self.renderers
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id.index())
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id.index())
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn scene_ids(&self) -> Vec<SceneId> {
        self.scenes.iter().map(|s| s.id).collect()
    }

    /// @ai:intent First scene registered with this name, across renderers
    /// @ai:effects pure
    pub fn scene_by_name(&self, name: &str) -> Option<&Scene> {
        self.scene_names.get(name).and_then(|id| self.scene(*id))
    }

    /// @ai:intent Resolve a scene by renderer and scene name, falling back to the name alone
    /// @ai:effects pure
    pub fn resolve_scene(&self, renderer: &str, name: &str) -> Option<&Scene> {
        self.renderer_by_name(renderer)
            .and_then(|r| {
                r.scenes
                    .iter()
                    .filter_map(|sid| self.scene(*sid))
                    .find(|s| s.name == name)
            })
            .or_else(|| self.scene_by_name(name))
    }

    /// @ai:intent Name of the renderer owning a scene
    /// @ai:effects pure
    pub fn renderer_name(&self, scene: SceneId) -> Option<&str> {
        self.scene(scene)
            .and_then(|s| self.renderer(s.renderer))
            .map(|r| r.name.as_str())
    }

    pub fn techniques(&self, kind: TechniqueKind) -> &TechniqueSet {
        match kind {
            TechniqueKind::Filter => &self.filters,
            TechniqueKind::Sampler => &self.samplers,
        }
    }

    pub fn techniques_mut(&mut self, kind: TechniqueKind) -> &mut TechniqueSet {
        match kind {
            TechniqueKind::Filter => &mut self.filters,
            TechniqueKind::Sampler => &mut self.samplers,
        }
    }

    /// @ai:intent Record on every scene the sample counts for which results are registered
    /// @ai:effects state:write
    pub fn record_result_spps(&mut self) {
        let pairs: Vec<(SceneId, u32)> = self
            .filters
            .results()
            .iter()
            .chain(self.samplers.results())
            .map(|r| (r.scene, r.spp))
            .collect();
        for (scene, spp) in pairs {
            if let Some(scene) = self.scene_mut(scene) {
                scene.record_spp(spp);
            }
        }
    }
}

/// @ai:intent Registry of the techniques, versions and results of one kind
#[derive(Debug, Clone)]
pub struct TechniqueSet {
    kind: TechniqueKind,
    techniques: Vec<Technique>,
    technique_names: HashMap<String, TechniqueId>,
    versions: Vec<TechniqueVersion>,
    results: Vec<TechniqueResult>,
    result_index: HashMap<(VersionId, SceneId, u32), ResultId>,
}

impl TechniqueSet {
    /// @ai:effects pure
    pub fn new(kind: TechniqueKind) -> Self {
        Self {
            kind,
            techniques: Vec::new(),
            technique_names: HashMap::new(),
            versions: Vec::new(),
            results: Vec::new(),
            result_index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> TechniqueKind {
        self.kind
    }

    /// @ai:intent Register a technique; names are unique within a kind
    /// @ai:effects state:write
    pub fn add_technique(&mut self, technique: NewTechnique) -> Result<TechniqueId> {
        if self.technique_names.contains_key(&technique.name) {
            return Err(Error::DuplicateTechnique {
                kind: self.kind.to_string(),
                name: technique.name,
            });
        }
        let id = TechniqueId::from_index(self.techniques.len());
        self.technique_names.insert(technique.name.clone(), id);
        self.techniques.push(Technique {
            id,
            kind: self.kind,
            name: technique.name,
            full_name: technique.full_name,
            comment: technique.comment,
            citation: technique.citation,
            versions: Vec::new(),
        });
        Ok(id)
    }

    /// @ai:intent Register a version; a technique holds at most one version per tag
    /// @ai:pre technique was returned by add_technique on this set
    /// @ai:effects state:write
    pub fn add_version(&mut self, technique: TechniqueId, version: NewVersion) -> Result<VersionId> {
        let owner = self
            .techniques
            .get(technique.index())
            .ok_or_else(|| Error::UnknownTechnique {
                kind: self.kind.to_string(),
                id: technique.to_string(),
            })?;
        if self.version_by_tag(&owner.name, &version.tag).is_some() {
            return Err(Error::DuplicateVersionTag {
                technique: owner.name.clone(),
                tag: version.tag,
            });
        }

        let id = VersionId::from_index(self.versions.len());
        let technique_name = owner.name.clone();
        self.versions.push(TechniqueVersion {
            id,
            technique,
            technique_name,
            tag: version.tag,
            message: version.message,
            executable: version.executable,
            status: version.status,
            results: Vec::new(),
        });
        self.techniques[technique.index()].versions.push(id);
        Ok(id)
    }

    /// @ai:intent Register a result; aborted, zero-spp, orphan and duplicate records are not retained
    /// @ai:effects state:write
    pub fn add_result(&mut self, record: ResultRecord) -> Option<ResultId> {
        if record.spp == 0 {
            tracing::warn!("Dropping result of version {} with zero samples per pixel", record.version);
            return None;
        }
        if record.aborted {
            tracing::debug!(
                "Dropping aborted result (version {}, scene {}, {} spp)",
                record.version,
                record.scene,
                record.spp
            );
            return None;
        }
        if self.version(record.version).is_none() {
            tracing::warn!("Dropping result of unknown version {}", record.version);
            return None;
        }
        let key = (record.version, record.scene, record.spp);
        if self.result_index.contains_key(&key) {
            tracing::debug!(
                "Duplicate result (version {}, scene {}, {} spp) ignored",
                record.version,
                record.scene,
                record.spp
            );
            return None;
        }

        let id = ResultId::from_index(self.results.len());
        self.versions[record.version.index()].results.push(id);
        self.result_index.insert(key, id);
        self.results.push(TechniqueResult::from_record(id, record));
        Some(id)
    }

    pub fn technique(&self, id: TechniqueId) -> Option<&Technique> {
        self.techniques.get(id.index())
    }

    pub fn technique_by_name(&self, name: &str) -> Option<&Technique> {
        self.technique_names
            .get(name)
            .and_then(|id| self.technique(*id))
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn version(&self, id: VersionId) -> Option<&TechniqueVersion> {
        self.versions.get(id.index())
    }

    pub fn versions(&self) -> &[TechniqueVersion] {
        &self.versions
    }

    pub fn version_ids(&self) -> Vec<VersionId> {
        self.versions.iter().map(|v| v.id).collect()
    }

    /// @ai:intent Find a version by technique name and tag
    /// @ai:effects pure
    pub fn version_by_tag(&self, technique: &str, tag: &str) -> Option<&TechniqueVersion> {
        let technique = self.technique_by_name(technique)?;
        technique
            .versions
            .iter()
            .filter_map(|vid| self.version(*vid))
            .find(|v| v.tag == tag)
    }

    /// @ai:intent Find a version by its display name (`name` or `name-tag`)
    /// @ai:effects pure
    pub fn version_by_name(&self, name: &str) -> Option<&TechniqueVersion> {
        self.versions.iter().find(|v| v.name() == name)
    }

    pub fn result(&self, id: ResultId) -> Option<&TechniqueResult> {
        self.results.get(id.index())
    }

    pub fn results(&self) -> &[TechniqueResult] {
        &self.results
    }

    /// @ai:intent Result of a version on a scene at a sample count, if any
    /// @ai:effects pure
    pub fn result_for(&self, version: VersionId, scene: SceneId, spp: u32) -> Option<&TechniqueResult> {
        self.result_index
            .get(&(version, scene, spp))
            .and_then(|id| self.result(*id))
    }

    /// @ai:intent All results of a version, in registration order
    /// @ai:effects pure
    pub fn results_of(&self, version: VersionId) -> impl Iterator<Item = &TechniqueResult> {
        self.version(version)
            .into_iter()
            .flat_map(|v| v.results.iter())
            .filter_map(|id| self.result(*id))
    }

    /// @ai:intent Sample counts with results for a version, optionally restricted to a scene
    /// @ai:effects pure
    pub fn sample_counts(&self, version: VersionId, scene: Option<SceneId>) -> BTreeSet<u32> {
        self.results_of(version)
            .filter(|r| scene.map_or(true, |s| r.scene == s))
            .map(|r| r.spp)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_version(tag: &str) -> NewVersion {
        NewVersion {
            tag: tag.to_string(),
            message: String::new(),
            executable: PathBuf::from("/nonexistent"),
            status: VersionStatus::NotCompiled,
        }
    }

    fn record(version: VersionId, scene: SceneId, spp: u32, aborted: bool) -> ResultRecord {
        ResultRecord {
            version,
            scene,
            spp,
            mse: 0.01,
            psnr: 30.0,
            ssim: 0.9,
            rmse: Some(0.1),
            exec_time_ms: 10.0,
            rendering_time_ms: 100.0,
            aborted,
        }
    }

    fn technique(name: &str) -> NewTechnique {
        NewTechnique {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ids_are_assigned_per_kind_from_one() {
        let mut catalog = Catalog::new();
        let f = catalog.filters.add_technique(technique("NFOR")).unwrap();
        let s = catalog.samplers.add_technique(technique("NFOR")).unwrap();
        assert_eq!(f, TechniqueId(1));
        assert_eq!(s, TechniqueId(1));
        assert_eq!(catalog.filters.technique(f).unwrap().kind, TechniqueKind::Filter);
        assert_eq!(catalog.samplers.technique(s).unwrap().kind, TechniqueKind::Sampler);
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let mut set = TechniqueSet::new(TechniqueKind::Filter);
        let t = set.add_technique(technique("LBF")).unwrap();
        set.add_version(t, new_version("default")).unwrap();
        set.add_version(t, new_version("v2")).unwrap();
        let err = set.add_version(t, new_version("v2")).unwrap_err();
        assert!(matches!(err, Error::DuplicateVersionTag { .. }));
        assert_eq!(set.technique(t).unwrap().versions.len(), 2);
        assert_eq!(set.version_by_tag("LBF", "v2").unwrap().name(), "LBF-v2");
        assert_eq!(set.version_by_name("LBF").unwrap().tag, "default");
    }

    #[test]
    fn test_version_of_unknown_technique_is_rejected() {
        let mut set = TechniqueSet::new(TechniqueKind::Sampler);
        let err = set.add_version(TechniqueId(3), new_version("default")).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownTechnique { ref kind, ref id } if kind == "sampler" && id == "3"
        ));
        assert!(set.versions().is_empty());
    }

    #[test]
    fn test_aborted_and_duplicate_results_are_not_retained() {
        let mut set = TechniqueSet::new(TechniqueKind::Filter);
        let t = set.add_technique(technique("LBF")).unwrap();
        let v = set.add_version(t, new_version("default")).unwrap();

        assert!(set.add_result(record(v, SceneId(1), 4, true)).is_none());
        let id = set.add_result(record(v, SceneId(1), 4, false)).unwrap();
        assert!(set.add_result(record(v, SceneId(1), 4, false)).is_none());
        assert!(set.add_result(record(VersionId(9), SceneId(1), 4, false)).is_none());
        assert!(set.add_result(record(v, SceneId(1), 0, false)).is_none());

        assert_eq!(set.results().len(), 1);
        assert_eq!(set.result_for(v, SceneId(1), 4).unwrap().id, id);
        assert!(set.result_for(v, SceneId(1), 8).is_none());
    }

    #[test]
    fn test_sample_counts_by_scene() {
        let mut set = TechniqueSet::new(TechniqueKind::Sampler);
        let t = set.add_technique(technique("SBF")).unwrap();
        let v = set.add_version(t, new_version("default")).unwrap();
        set.add_result(record(v, SceneId(1), 8, false));
        set.add_result(record(v, SceneId(1), 4, false));
        set.add_result(record(v, SceneId(2), 16, false));

        assert_eq!(set.sample_counts(v, None).into_iter().collect::<Vec<_>>(), vec![4, 8, 16]);
        assert_eq!(
            set.sample_counts(v, Some(SceneId(1))).into_iter().collect::<Vec<_>>(),
            vec![4, 8]
        );
    }

    #[test]
    fn test_placeholder_renderer_and_scene_resolution() {
        let mut catalog = Catalog::new();
        let pbrt = catalog.add_renderer("pbrt", PathBuf::from("pbrt/pbrt"), true);
        let gone = catalog.ensure_renderer("mitsuba");
        assert_eq!(catalog.ensure_renderer("pbrt"), pbrt);
        assert!(!catalog.renderer(gone).unwrap().is_ready);
        assert!(catalog.renderer(gone).unwrap().executable.is_none());

        let a = catalog
            .add_scene(pbrt, NewScene { name: "box".to_string(), ..Default::default() })
            .unwrap();
        let b = catalog
            .add_scene(gone, NewScene { name: "box".to_string(), ..Default::default() })
            .unwrap();
        assert!(catalog
            .add_scene(pbrt, NewScene { name: "box".to_string(), ..Default::default() })
            .is_none());

        assert_eq!(catalog.resolve_scene("mitsuba", "box").unwrap().id, b);
        assert_eq!(catalog.resolve_scene("unknown", "box").unwrap().id, a);
        assert_eq!(catalog.renderer_name(b), Some("mitsuba"));
    }

    #[test]
    fn test_record_result_spps() {
        let mut catalog = Catalog::new();
        let r = catalog.ensure_renderer("pbrt");
        let scene = catalog
            .add_scene(r, NewScene { name: "box".to_string(), ..Default::default() })
            .unwrap();
        let t = catalog.filters.add_technique(technique("LBF")).unwrap();
        let v = catalog.filters.add_version(t, new_version("default")).unwrap();
        catalog.filters.add_result(record(v, scene, 16, false));
        catalog.filters.add_result(record(v, scene, 4, false));

        catalog.record_result_spps();
        assert_eq!(catalog.scene(scene).unwrap().spps, vec![4, 16]);
    }
}
