//! @ai:module:intent Build the catalog from the workspace: metadata, result logs and snapshots
//! @ai:module:layer infrastructure
//! @ai:module:public_api CatalogLoader, CatalogLoaderTrait, load_* functions, lookups

pub mod catalog;
pub mod lookup;
pub mod manifest;
pub mod results;
pub mod snapshot;

pub use catalog::{load_renderers, load_scenes, load_techniques, scan_scenes};
pub use lookup::{scenes_from_ids, versions_from_ids, Lookup};
pub use manifest::{ErrorLog, ExecutionLog, SceneDescriptor, ScenesCacheEntry};
pub use results::{load_results, read_result, ResultFiles};
pub use snapshot::load_snapshot;

use crate::error::Result;
use crate::model::{Catalog, TechniqueKind};
use crate::workspace::Workspace;

/// @ai:intent Trait for loading the catalog of a workspace
pub trait CatalogLoaderTrait {
    /// @ai:intent Load renderers, scenes and techniques
    fn load(&self, workspace: &Workspace) -> Result<Catalog>;

    /// @ai:intent Load the catalog plus the results stored in the current slot
    fn load_with_results(&self, workspace: &Workspace) -> Result<Catalog>;
}

/// @ai:intent Loads the catalog of a workspace from disk
pub struct CatalogLoader;

impl CatalogLoader {
    /// @ai:intent Create a new catalog loader
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogLoaderTrait for CatalogLoader {
    /// @ai:effects fs:read
    fn load(&self, workspace: &Workspace) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        load_scenes(&mut catalog, &workspace.scenes_cache(), &workspace.renderers_dir())?;
        for kind in TechniqueKind::ALL {
            load_techniques(&mut catalog, &workspace.techniques_dir(kind), kind);
        }
        tracing::debug!(
            "Catalog: {} renderers, {} scenes, {} filters, {} samplers",
            catalog.renderers().len(),
            catalog.scenes().len(),
            catalog.filters.techniques().len(),
            catalog.samplers.techniques().len()
        );
        Ok(catalog)
    }

    /// @ai:effects fs:read
    fn load_with_results(&self, workspace: &Workspace) -> Result<Catalog> {
        let mut catalog = self.load(workspace)?;
        for kind in TechniqueKind::ALL {
            load_results(&mut catalog, kind, &workspace.kind_results_dir(kind));
        }
        Ok(catalog)
    }
}
