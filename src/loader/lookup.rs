//! @ai:module:intent Resolve user-supplied numeric ids against a loaded catalog
//! @ai:module:layer application
//! @ai:module:public_api Lookup, scenes_from_ids, versions_from_ids
//! @ai:module:stateless true

use crate::model::{Catalog, SceneId, TechniqueKind, VersionId};

/// @ai:intent Ids that resolved, in request order, and the ones that did not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<T> {
    pub found: Vec<T>,
    pub unknown: Vec<u32>,
}

/// @ai:intent Scenes for the given ids; an empty request selects every scene
/// @ai:effects pure
pub fn scenes_from_ids(catalog: &Catalog, ids: &[u32]) -> Lookup<SceneId> {
    if ids.is_empty() {
        return Lookup {
            found: catalog.scene_ids(),
            unknown: Vec::new(),
        };
    }
    let mut lookup = Lookup {
        found: Vec::new(),
        unknown: Vec::new(),
    };
    for id in ids {
        match catalog.scene(SceneId(*id)) {
            Some(scene) if !lookup.found.contains(&scene.id) => lookup.found.push(scene.id),
            Some(_) => {}
            None => {
                tracing::warn!("No scene with id {} found", id);
                lookup.unknown.push(*id);
            }
        }
    }
    lookup
}

/// @ai:intent Versions of one kind for the given ids
/// @ai:effects pure
pub fn versions_from_ids(catalog: &Catalog, kind: TechniqueKind, ids: &[u32]) -> Lookup<VersionId> {
    let set = catalog.techniques(kind);
    let mut lookup = Lookup {
        found: Vec::new(),
        unknown: Vec::new(),
    };
    for id in ids {
        match set.version(VersionId(*id)) {
            Some(version) if !lookup.found.contains(&version.id) => lookup.found.push(version.id),
            Some(_) => {}
            None => {
                tracing::warn!("No {} version with id {} found", kind, id);
                lookup.unknown.push(*id);
            }
        }
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewScene;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenes_from_ids() {
        let mut catalog = Catalog::new();
        let r = catalog.ensure_renderer("pbrt");
        for name in ["a", "b", "c"] {
            catalog.add_scene(r, NewScene { name: name.to_string(), ..Default::default() });
        }

        assert_eq!(scenes_from_ids(&catalog, &[]).found.len(), 3);
        let lookup = scenes_from_ids(&catalog, &[3, 9, 1, 3, 0]);
        assert_eq!(lookup.found, vec![SceneId(3), SceneId(1)]);
        assert_eq!(lookup.unknown, vec![9, 0]);
    }

    #[test]
    fn test_versions_from_ids_on_empty_catalog() {
        let catalog = Catalog::new();
        let lookup = versions_from_ids(&catalog, TechniqueKind::Filter, &[1]);
        assert!(lookup.found.is_empty());
        assert_eq!(lookup.unknown, vec![1]);
    }
}
