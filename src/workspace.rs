//! @ai:module:intent Workspace layout: resolved directories, result slots and the current-entry pointers
//! @ai:module:layer infrastructure
//! @ai:module:public_api Workspace, Entry, CURRENT_SLOT_LINK
//! @ai:module:stateless false

use crate::config::WorkspaceConfig;
use crate::error::{Error, Result};
use crate::model::TechniqueKind;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Pointer to the selected slot inside the results directory.
pub const CURRENT_SLOT_LINK: &str = ".current";

/// @ai:intent A named item of a listing directory (configuration or slot) with its creation time
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub created: SystemTime,
    pub is_current: bool,
}

impl Entry {
    /// @ai:intent Creation date rendered as day/month/year
    /// @ai:effects pure
    pub fn created_date(&self) -> String {
        DateTime::<Utc>::from(self.created)
            .format("%d/%m/%Y")
            .to_string()
    }
}

/// @ai:intent A benchmark workspace rooted at a directory, with its settings
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: WorkspaceConfig,
}

impl Workspace {
    /// @ai:effects pure
    pub fn new(root: impl Into<PathBuf>, config: WorkspaceConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// @ai:intent Open a workspace, reading `fbksd.toml` when present
    /// @ai:effects fs:read
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = WorkspaceConfig::load_or_default(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn scenes_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.scenes_dir)
    }

    pub fn scenes_cache(&self) -> PathBuf {
        self.scenes_dir().join(&self.config.paths.scenes_cache)
    }

    pub fn renderers_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.renderers_dir)
    }

    /// @ai:intent Installation directory of the techniques of one kind
    pub fn techniques_dir(&self, kind: TechniqueKind) -> PathBuf {
        match kind {
            TechniqueKind::Filter => self.resolve(&self.config.paths.denoisers_dir),
            TechniqueKind::Sampler => self.resolve(&self.config.paths.samplers_dir),
        }
    }

    pub fn configs_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.configs_dir)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.results_dir)
    }

    pub fn current_slot_dir(&self) -> PathBuf {
        self.results_dir().join(CURRENT_SLOT_LINK)
    }

    /// @ai:intent Root of the result images of one kind inside the current slot
    pub fn kind_results_dir(&self, kind: TechniqueKind) -> PathBuf {
        self.current_slot_dir().join(kind.results_dir_name())
    }

    /// @ai:intent List result slots, oldest first, marking the selected one
    /// @ai:effects fs:read
    pub fn slots(&self) -> Result<Vec<Entry>> {
        let results_dir = self.results_dir();
        if !results_dir.is_dir() {
            return Ok(Vec::new());
        }
        let current = link_target_name(&self.current_slot_dir());
        list_entries(&results_dir, current.as_deref(), |path| path.is_dir())
    }

    /// @ai:intent Create a result slot and make it current
    /// @ai:effects fs:write
    pub fn create_slot(&self, name: &str) -> Result<()> {
        let path = self.results_dir().join(name);
        if name.starts_with('.') || path.exists() {
            return Err(Error::SlotExists(name.to_string()));
        }
        std::fs::create_dir_all(&path).map_err(|e| Error::write(&path, e))?;
        relink(&self.current_slot_dir(), name)?;
        tracing::info!("Created result slot '{}'", name);
        Ok(())
    }

    /// @ai:intent Make the slot at the given 1-based position current
    /// @ai:effects fs:write
    pub fn select_slot(&self, index: usize) -> Result<String> {
        let slots = self.slots()?;
        let slot = index
            .checked_sub(1)
            .and_then(|i| slots.get(i))
            .ok_or(Error::InvalidSlotId(index))?;
        relink(&self.current_slot_dir(), &slot.name)?;
        Ok(slot.name.clone())
    }
}

/// @ai:intent File name a symlink points to, without a `.json` extension
/// @ai:effects fs:read
pub(crate) fn link_target_name(link: &Path) -> Option<String> {
    let target = std::fs::read_link(link).ok()?;
    let name = target.file_name()?.to_string_lossy().into_owned();
    Some(entry_name(name))
}

fn entry_name(file_name: String) -> String {
    match file_name.strip_suffix(".json") {
        Some(stem) => stem.to_string(),
        None => file_name,
    }
}

/// @ai:intent Point `link` at a sibling named `target`, replacing a previous symlink
/// @ai:effects fs:write
pub(crate) fn relink(link: &Path, target: &str) -> Result<()> {
    match std::fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::remove_file(link).map_err(|e| Error::write(link, e))?;
        }
        Ok(_) => return Err(Error::NotASymlink(link.to_path_buf())),
        Err(_) => {}
    }
    symlink(target, link).map_err(|e| Error::write(link, e))
}

#[cfg(unix)]
fn symlink(target: &str, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &str, link: &Path) -> std::io::Result<()> {
    let sibling = link.with_file_name(target);
    if sibling.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// @ai:intent Non-symlink, non-hidden entries of a directory accepted by `keep`, oldest first
/// @ai:effects fs:read
pub(crate) fn list_entries(
    dir: &Path,
    current: Option<&str>,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in std::fs::read_dir(dir).map_err(|e| Error::read(dir, e))? {
        let item = item.map_err(|e| Error::read(dir, e))?;
        let path = item.path();
        let file_name = item.file_name().to_string_lossy().into_owned();
        let meta = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if meta.file_type().is_symlink() || file_name.starts_with('.') || !keep(&path) {
            continue;
        }
        let name = entry_name(file_name);
        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push(Entry {
            is_current: current == Some(name.as_str()),
            name,
            created,
        });
    }
    entries.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> Workspace {
        let ws = Workspace::new(temp.path(), WorkspaceConfig::default());
        std::fs::create_dir_all(ws.results_dir()).unwrap();
        ws
    }

    #[test]
    fn test_paths_follow_settings() {
        let temp = TempDir::new().unwrap();
        let mut config = WorkspaceConfig::default();
        config.paths.samplers_dir = PathBuf::from("/opt/samplers");
        let ws = Workspace::new(temp.path(), config);

        assert_eq!(ws.techniques_dir(TechniqueKind::Sampler), PathBuf::from("/opt/samplers"));
        assert_eq!(ws.techniques_dir(TechniqueKind::Filter), temp.path().join("denoisers"));
        assert_eq!(
            ws.kind_results_dir(TechniqueKind::Filter),
            temp.path().join("results/.current/denoisers")
        );
        assert_eq!(ws.scenes_cache(), temp.path().join("scenes/.fbksd-scenes-cache.json"));
    }

    #[test]
    fn test_create_and_select_slots() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);

        ws.create_slot("first").unwrap();
        ws.create_slot("second").unwrap();
        let slots = ws.slots().unwrap();
        let names: Vec<_> = slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"first") && names.contains(&"second"));
        assert_eq!(slots.iter().filter(|s| s.is_current).count(), 1);
        assert_eq!(link_target_name(&ws.current_slot_dir()).as_deref(), Some("second"));

        let position = slots.iter().position(|s| s.name == "first").unwrap() + 1;
        assert_eq!(ws.select_slot(position).unwrap(), "first");
        assert_eq!(link_target_name(&ws.current_slot_dir()).as_deref(), Some("first"));
    }

    #[test]
    fn test_slot_errors() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        ws.create_slot("main").unwrap();

        assert!(matches!(ws.create_slot("main"), Err(Error::SlotExists(_))));
        assert!(matches!(ws.select_slot(0), Err(Error::InvalidSlotId(0))));
        assert!(matches!(ws.select_slot(2), Err(Error::InvalidSlotId(2))));
    }

    #[test]
    fn test_relink_refuses_real_directory() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        std::fs::create_dir_all(ws.current_slot_dir()).unwrap();
        assert!(matches!(ws.create_slot("main"), Err(Error::NotASymlink(_))));
    }

    #[test]
    fn test_created_date_format() {
        let entry = Entry {
            name: "a".to_string(),
            created: SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(86_400 * 31),
            is_current: false,
        };
        assert_eq!(entry.created_date(), "01/02/1970");
    }
}
