//! @ai:module:intent Scene selections that either admit every sample count or a fixed subset
//! @ai:module:layer domain
//! @ai:module:public_api SceneScope
//! @ai:module:stateless true

use crate::model::entities::SceneId;

/// @ai:intent A scene, optionally restricted to a set of sample counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneScope {
    /// Every sample count with results for the scene
    All(SceneId),
    /// Only the listed sample counts, sorted and unique
    Scoped { scene: SceneId, sample_counts: Vec<u32> },
}

impl SceneScope {
    /// @ai:intent Build a scoped selection, normalizing the sample counts
    /// @ai:effects pure
    pub fn scoped(scene: SceneId, mut sample_counts: Vec<u32>) -> Self {
        sample_counts.sort_unstable();
        sample_counts.dedup();
        SceneScope::Scoped {
            scene,
            sample_counts,
        }
    }

    pub fn scene(&self) -> SceneId {
        match self {
            SceneScope::All(scene) => *scene,
            SceneScope::Scoped { scene, .. } => *scene,
        }
    }

    /// @ai:intent Whether results at this sample count belong to the selection
    /// @ai:effects pure
    pub fn allows(&self, spp: u32) -> bool {
        match self {
            SceneScope::All(_) => true,
            SceneScope::Scoped { sample_counts, .. } => sample_counts.binary_search(&spp).is_ok(),
        }
    }

    /// `None` for unrestricted scopes.
    pub fn sample_counts(&self) -> Option<&[u32]> {
        match self {
            SceneScope::All(_) => None,
            SceneScope::Scoped { sample_counts, .. } => Some(sample_counts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_admits_everything() {
        let scope = SceneScope::All(SceneId(2));
        assert_eq!(scope.scene(), SceneId(2));
        assert!(scope.allows(1));
        assert!(scope.allows(1024));
        assert_eq!(scope.sample_counts(), None);
    }

    #[test]
    fn test_scoped_admits_only_its_counts() {
        let scope = SceneScope::scoped(SceneId(1), vec![16, 4, 16]);
        assert!(scope.allows(4));
        assert!(scope.allows(16));
        assert!(!scope.allows(8));
        assert_eq!(scope.sample_counts(), Some(&[4, 16][..]));
    }
}
