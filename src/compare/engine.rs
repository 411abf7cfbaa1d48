//! @ai:module:intent Compare result images against references, reusing fresh error logs, and collect results
//! @ai:module:layer application
//! @ai:module:public_api ResultComparer, CompareOptions, CompareOutcome, Skip, SkipReason
//! @ai:module:stateless true

use crate::compare::comparator::{Comparator, ERRORS_FILE, ERROR_MAPS};
use crate::compare::paths::{CandidatePath, ResultPathParser};
use crate::compare::staleness::cache_is_valid;
use crate::error::{Error, Result};
use crate::loader::results::{read_result, ResultFiles};
use crate::model::{Catalog, ResultRecord, SceneId, SceneScope, TechniqueKind, VersionId};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Restrictions and policy for one comparison pass
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Recompute even when the cached error log is fresh
    pub overwrite: bool,
    /// Only these scenes (and, for scoped scenes, these sample counts)
    pub scenes: Option<Vec<SceneScope>>,
    /// Only these versions
    pub versions: Option<HashSet<VersionId>>,
}

/// @ai:intent Why a candidate image produced no comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnparsablePath,
    OtherReplica(u32),
    UnknownTechnique(String),
    UnknownVersion { technique: String, tag: String },
    UnknownScene(String),
    NotSelected,
    MissingReference(PathBuf),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnparsablePath => write!(f, "path does not follow <technique>/<tag>/<scene>/<spp>_<replica>.exr"),
            SkipReason::OtherReplica(replica) => write!(f, "replica {} is not compared", replica),
            SkipReason::UnknownTechnique(name) => write!(f, "unknown technique '{}'", name),
            SkipReason::UnknownVersion { technique, tag } => {
                write!(f, "technique '{}' has no version '{}'", technique, tag)
            }
            SkipReason::UnknownScene(name) => write!(f, "unknown scene '{}'", name),
            SkipReason::NotSelected => write!(f, "not selected"),
            SkipReason::MissingReference(path) => write!(f, "reference {} not found", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub image: PathBuf,
    pub reason: SkipReason,
}

/// @ai:intent Result of a comparison pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareOutcome {
    pub records: Vec<ResultRecord>,
    /// Candidates sent to the comparator
    pub recomputed: usize,
    /// Candidates whose cached error log was reused
    pub up_to_date: usize,
    /// Candidates the comparator could not process
    pub failed: usize,
    pub skipped: Vec<Skip>,
}

impl CompareOutcome {
    /// @ai:intent Register the collected records in the catalog; returns how many were new
    /// @ai:effects state:write
    pub fn register(&self, catalog: &mut Catalog, kind: TechniqueKind) -> usize {
        let added = self
            .records
            .iter()
            .filter(|record| catalog.techniques_mut(kind).add_result((*record).clone()).is_some())
            .count();
        catalog.record_result_spps();
        added
    }
}

#[derive(Debug, Clone, Copy)]
struct ResultRecordKey {
    version: VersionId,
    scene: SceneId,
}

/// @ai:intent Runs the caching comparison policy over a kind's results root
pub struct ResultComparer<'a, C: Comparator> {
    comparator: &'a C,
    scenes_dir: PathBuf,
    parser: ResultPathParser,
}

impl<'a, C: Comparator> ResultComparer<'a, C> {
    /// @ai:effects pure
    pub fn new(comparator: &'a C, scenes_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            comparator,
            scenes_dir: scenes_dir.into(),
            parser: ResultPathParser::new()?,
        })
    }

    /// @ai:intent Result images below `root`, in sorted path order
    /// @ai:effects fs:read
    fn candidates(root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "exr"))
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    /// @ai:intent Map a candidate to its version and scene, or the reason it is skipped
    /// @ai:effects fs:read
    fn resolve(
        &self,
        catalog: &Catalog,
        kind: TechniqueKind,
        candidate: &CandidatePath,
        options: &CompareOptions,
    ) -> std::result::Result<(ResultFiles, ResultRecordKey, PathBuf), SkipReason> {
        if candidate.replica != 0 {
            return Err(SkipReason::OtherReplica(candidate.replica));
        }
        let set = catalog.techniques(kind);
        if set.technique_by_name(&candidate.technique).is_none() {
            return Err(SkipReason::UnknownTechnique(candidate.technique.clone()));
        }
        let version = set
            .version_by_tag(&candidate.technique, &candidate.tag)
            .ok_or_else(|| SkipReason::UnknownVersion {
                technique: candidate.technique.clone(),
                tag: candidate.tag.clone(),
            })?;
        let scene = catalog
            .scene_by_name(&candidate.scene)
            .ok_or_else(|| SkipReason::UnknownScene(candidate.scene.clone()))?;

        if let Some(versions) = &options.versions {
            if !versions.contains(&version.id) {
                return Err(SkipReason::NotSelected);
            }
        }
        if let Some(scopes) = &options.scenes {
            let admitted = scopes
                .iter()
                .any(|scope| scope.scene() == scene.id && scope.allows(candidate.spp));
            if !admitted {
                return Err(SkipReason::NotSelected);
            }
        }

        let renderer = catalog.renderer_name(scene.id).unwrap_or_default();
        let reference = scene.reference_path(&self.scenes_dir, renderer);
        if !reference.is_file() {
            return Err(SkipReason::MissingReference(reference));
        }

        let dir = candidate
            .image
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let files = ResultFiles::new(dir, candidate.spp, candidate.replica);
        Ok((
            files,
            ResultRecordKey {
                version: version.id,
                scene: scene.id,
            },
            reference,
        ))
    }

    /// @ai:intent Remove comparator outputs left in the work dir by a previous candidate
    /// @ai:effects fs:write
    fn clear_outputs(work_dir: &Path) -> Result<()> {
        for name in std::iter::once(ERRORS_FILE).chain(ERROR_MAPS) {
            let path = work_dir.join(name);
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| Error::write(&path, e))?;
            }
        }
        Ok(())
    }

    /// @ai:intent Run the comparator and move its outputs next to the candidate image
    /// @ai:effects io, fs:write
    fn recompute(&self, files: &ResultFiles, reference: &Path, work_dir: &Path) -> Result<()> {
        Self::clear_outputs(work_dir)?;
        let moved = self.compare_into(files, reference, work_dir);
        if moved.is_err() {
            if let Err(e) = Self::clear_outputs(work_dir) {
                tracing::warn!("Leftover comparator output in {}: {}", work_dir.display(), e);
            }
        }
        moved
    }

    /// @ai:effects io, fs:write
    fn compare_into(&self, files: &ResultFiles, reference: &Path, work_dir: &Path) -> Result<()> {
        let produced = work_dir.join(ERRORS_FILE);
        self.comparator.compare(reference, &files.image(), work_dir)?;

        if !produced.is_file() {
            return Err(Error::MissingOutput {
                tool: "comparator".to_string(),
                path: produced,
            });
        }
        let target = files.errors_log();
        std::fs::rename(&produced, &target).map_err(|e| Error::write(&target, e))?;

        for map in ERROR_MAPS {
            let source = work_dir.join(map);
            let target = files.error_map(map);
            if let Err(e) = std::fs::rename(&source, &target) {
                tracing::warn!("Error map {} not moved to {}: {}", source.display(), target.display(), e);
            }
        }
        Ok(())
    }

    /// @ai:intent Compare every candidate of one kind under `root` and collect their results
    /// @ai:effects io, fs:read, fs:write
    pub fn compare_kind(
        &self,
        catalog: &Catalog,
        kind: TechniqueKind,
        root: &Path,
        options: &CompareOptions,
    ) -> CompareOutcome {
        let mut outcome = CompareOutcome::default();

        for image in Self::candidates(root) {
            let Some(candidate) = self.parser.parse(root, &image) else {
                tracing::warn!("Skipping {}: unexpected result path", image.display());
                outcome.skipped.push(Skip {
                    image,
                    reason: SkipReason::UnparsablePath,
                });
                continue;
            };

            let (files, key, reference) = match self.resolve(catalog, kind, &candidate, options) {
                Ok(resolved) => resolved,
                Err(reason) => {
                    match &reason {
                        SkipReason::OtherReplica(_) | SkipReason::NotSelected => {
                            tracing::debug!("Skipping {}: {}", image.display(), reason)
                        }
                        _ => tracing::warn!("Skipping {}: {}", image.display(), reason),
                    }
                    outcome.skipped.push(Skip { image, reason });
                    continue;
                }
            };

            if !options.overwrite && cache_is_valid(&files, &reference) {
                tracing::debug!("Up to date: {}", image.display());
                outcome.up_to_date += 1;
            } else {
                tracing::info!("Comparing {}", image.display());
                if let Err(e) = self.recompute(&files, &reference, root) {
                    tracing::error!("Comparison of {} failed: {}", image.display(), e);
                    outcome.failed += 1;
                    continue;
                }
                outcome.recomputed += 1;
            }

            if let Some(record) = read_result(&files, key.version, key.scene) {
                outcome.records.push(record);
            }
        }

        tracing::info!(
            "{} comparison: {} recomputed, {} up to date, {} failed, {} skipped",
            kind,
            outcome.recomputed,
            outcome.up_to_date,
            outcome.failed,
            outcome.skipped.len()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewScene, NewTechnique, NewVersion, VersionStatus};
    use filetime::{set_file_mtime, FileTime};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FakeComparator {
        calls: Cell<usize>,
        fail: bool,
    }

    impl FakeComparator {
        fn new() -> Self {
            Self { calls: Cell::new(0), fail: false }
        }
    }

    impl Comparator for FakeComparator {
        fn compare(&self, _reference: &Path, _candidate: &Path, work_dir: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(Error::ToolFailed { tool: "fake".to_string(), status: "1".to_string() });
            }
            std::fs::write(
                work_dir.join(ERRORS_FILE),
                r#"{"mse": 0.02, "psnr": 17.0, "ssim": 0.7, "rmse": 0.14}"#,
            )?;
            std::fs::write(work_dir.join("mse_map.png"), b"png")?;
            Ok(())
        }
    }

    struct Fixture {
        _temp: TempDir,
        catalog: Catalog,
        scenes_dir: PathBuf,
        root: PathBuf,
        version: VersionId,
        scene: SceneId,
    }

    const OLD: i64 = 1_000_000;

    fn touch(path: &Path, content: &[u8], mtime: i64) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let scenes_dir = temp.path().join("scenes");
        let root = temp.path().join("slot/denoisers");

        let mut catalog = Catalog::new();
        let renderer = catalog.ensure_renderer("pbrt");
        let scene = catalog
            .add_scene(
                renderer,
                NewScene {
                    name: "box".to_string(),
                    reference: PathBuf::from("box/ref.exr"),
                    ..Default::default()
                },
            )
            .unwrap();
        let technique = catalog
            .filters
            .add_technique(NewTechnique { name: "LBF".to_string(), ..Default::default() })
            .unwrap();
        let version = catalog
            .filters
            .add_version(
                technique,
                NewVersion {
                    tag: "default".to_string(),
                    message: String::new(),
                    executable: PathBuf::from("LBF"),
                    status: VersionStatus::Ready,
                },
            )
            .unwrap();

        touch(&scenes_dir.join("pbrt/box/ref.exr"), b"ref", OLD);
        let dir = root.join("LBF/default/box");
        for spp in [4, 8] {
            let files = ResultFiles::new(&dir, spp, 0);
            touch(&files.image(), b"exr", OLD);
            touch(
                &files.execution_log(),
                br#"{"aborted": false, "reconstruction_time": {"time_ms": 5.0}, "rendering_time": {"time_ms": 50.0}}"#,
                OLD,
            );
        }
        touch(&dir.join("8_1.exr"), b"exr", OLD);

        Fixture { _temp: temp, catalog, scenes_dir, root, version, scene }
    }

    #[test]
    fn test_second_pass_reuses_logs() {
        let f = fixture();
        let comparator = FakeComparator::new();
        let comparer = ResultComparer::new(&comparator, &f.scenes_dir).unwrap();
        let options = CompareOptions::default();

        let first = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &options);
        assert_eq!(first.recomputed, 2);
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.skipped.len(), 1);
        assert_eq!(first.skipped[0].reason, SkipReason::OtherReplica(1));
        assert!(ResultFiles::new(f.root.join("LBF/default/box"), 4, 0)
            .error_map("mse_map.png")
            .is_file());

        let second = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &options);
        assert_eq!(second.recomputed, 0);
        assert_eq!(second.up_to_date, 2);
        assert_eq!(second.records, first.records);
        assert_eq!(comparator.calls.get(), 2);
    }

    #[test]
    fn test_newer_image_is_recomputed() {
        let f = fixture();
        let comparator = FakeComparator::new();
        let comparer = ResultComparer::new(&comparator, &f.scenes_dir).unwrap();
        let options = CompareOptions::default();
        comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &options);

        let files = ResultFiles::new(f.root.join("LBF/default/box"), 8, 0);
        set_file_mtime(files.errors_log(), FileTime::from_unix_time(OLD + 10, 0)).unwrap();
        set_file_mtime(files.image(), FileTime::from_unix_time(OLD + 20, 0)).unwrap();

        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &options);
        assert_eq!(outcome.recomputed, 1);
        assert_eq!(outcome.up_to_date, 1);
    }

    #[test]
    fn test_overwrite_and_selection() {
        let f = fixture();
        let comparator = FakeComparator::new();
        let comparer = ResultComparer::new(&comparator, &f.scenes_dir).unwrap();
        comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &CompareOptions::default());

        let options = CompareOptions {
            overwrite: true,
            scenes: Some(vec![SceneScope::scoped(f.scene, vec![8])]),
            versions: None,
        };
        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &options);
        assert_eq!(outcome.recomputed, 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].spp, 8);

        let none_selected = CompareOptions {
            versions: Some(HashSet::from([VersionId(99)])),
            ..Default::default()
        };
        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &none_selected);
        assert!(outcome.records.is_empty());
        assert!(outcome.skipped.iter().all(|s| s.reason == SkipReason::NotSelected
            || matches!(s.reason, SkipReason::OtherReplica(_))));
    }

    #[test]
    fn test_failed_comparison_produces_no_result() {
        let f = fixture();
        let comparator = FakeComparator { calls: Cell::new(0), fail: true };
        let comparer = ResultComparer::new(&comparator, &f.scenes_dir).unwrap();

        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &CompareOptions::default());
        assert_eq!(outcome.failed, 2);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_missing_reference_is_skipped() {
        let f = fixture();
        std::fs::remove_file(f.scenes_dir.join("pbrt/box/ref.exr")).unwrap();
        let comparator = FakeComparator::new();
        let comparer = ResultComparer::new(&comparator, &f.scenes_dir).unwrap();

        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &CompareOptions::default());
        assert_eq!(comparator.calls.get(), 0);
        assert!(outcome
            .skipped
            .iter()
            .any(|s| matches!(s.reason, SkipReason::MissingReference(_))));
    }

    /// Writes an ssim map for 4 spp and then fails; succeeds without maps otherwise.
    struct HalfFailingComparator;

    impl Comparator for HalfFailingComparator {
        fn compare(&self, _reference: &Path, candidate: &Path, work_dir: &Path) -> Result<()> {
            if candidate.ends_with("4_0.exr") {
                std::fs::write(work_dir.join("ssim_map.png"), b"maps-of-spp-4")?;
                return Err(Error::ToolFailed { tool: "fake".to_string(), status: "1".to_string() });
            }
            std::fs::write(work_dir.join(ERRORS_FILE), r#"{"mse": 0.02, "psnr": 17.0, "ssim": 0.7}"#)?;
            Ok(())
        }
    }

    #[test]
    fn test_failed_comparison_leaves_no_maps_behind() {
        let f = fixture();
        let comparer = ResultComparer::new(&HalfFailingComparator, &f.scenes_dir).unwrap();

        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &CompareOptions::default());
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.recomputed, 1);
        let dir = f.root.join("LBF/default/box");
        assert!(!ResultFiles::new(&dir, 8, 0).error_map("ssim_map.png").exists());
        assert!(!ResultFiles::new(&dir, 4, 0).error_map("ssim_map.png").exists());
        assert!(!f.root.join("ssim_map.png").exists());
    }

    #[test]
    fn test_unresolved_candidates_are_skipped_without_comparing() {
        let f = fixture();
        let root = f._temp.path().join("stray");
        for path in [
            "LBF/default/gone/4_0.exr",
            "XYZ/default/box/4_0.exr",
            "LBF/v9/box/4_0.exr",
            "LBF/default/box/junk.exr",
        ] {
            touch(&root.join(path), b"exr", OLD);
        }
        let comparator = FakeComparator::new();
        let comparer = ResultComparer::new(&comparator, &f.scenes_dir).unwrap();

        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &root, &CompareOptions::default());
        assert_eq!(comparator.calls.get(), 0);
        assert_eq!(outcome.recomputed + outcome.up_to_date + outcome.failed, 0);
        assert!(outcome.records.is_empty());
        let skipped: Vec<(PathBuf, SkipReason)> = outcome
            .skipped
            .into_iter()
            .map(|s| (s.image.strip_prefix(&root).unwrap().to_path_buf(), s.reason))
            .collect();
        assert_eq!(
            skipped,
            vec![
                (PathBuf::from("LBF/default/box/junk.exr"), SkipReason::UnparsablePath),
                (
                    PathBuf::from("LBF/default/gone/4_0.exr"),
                    SkipReason::UnknownScene("gone".to_string())
                ),
                (
                    PathBuf::from("LBF/v9/box/4_0.exr"),
                    SkipReason::UnknownVersion { technique: "LBF".to_string(), tag: "v9".to_string() }
                ),
                (
                    PathBuf::from("XYZ/default/box/4_0.exr"),
                    SkipReason::UnknownTechnique("XYZ".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_register_outcome() {
        let mut f = fixture();
        let comparator = FakeComparator::new();
        let comparer = ResultComparer::new(&comparator, &f.scenes_dir).unwrap();
        let outcome = comparer.compare_kind(&f.catalog, TechniqueKind::Filter, &f.root, &CompareOptions::default());

        assert_eq!(outcome.register(&mut f.catalog, TechniqueKind::Filter), 2);
        assert_eq!(f.catalog.scene(f.scene).unwrap().spps, vec![4, 8]);
        let result = f.catalog.filters.result_for(f.version, f.scene, 4).unwrap();
        assert_eq!(result.rmse, Some(0.14));
        assert_eq!(result.exec_time_ms, 5.0);
    }
}
