//! @ai:module:intent Entity model of the benchmark catalog and its identity registries
//! @ai:module:layer domain
//! @ai:module:public_api Catalog, TechniqueSet, SceneScope, entity types

pub mod catalog;
pub mod entities;
pub mod scope;

pub use catalog::{Catalog, NewScene, NewTechnique, NewVersion, TechniqueSet};
pub use entities::{
    ImageRegion, NoiseWeights, Renderer, RendererId, ResultId, ResultRecord, Scene, SceneId,
    Technique, TechniqueId, TechniqueKind, TechniqueResult, TechniqueVersion, VersionId,
    VersionStatus, DEFAULT_TAG,
};
pub use scope::SceneScope;
