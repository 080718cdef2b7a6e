// Centralized path constants and utilities for the persistent state layout
// (§6 External Interfaces)

use std::path::{Path, PathBuf};

/// SCRUMForge directory structure constants.
pub struct Paths;

impl Paths {
    /// State root directory, relative to the project.
    pub const STATE_ROOT: &'static str = ".scrumforge";

    /// Project configuration file, TOML.
    pub const CONFIG: &'static str = ".scrumforge/config";

    /// Entity data directory.
    pub const DATA_DIR: &'static str = ".scrumforge/data";

    /// Agent descriptor directory.
    pub const AGENTS_DIR: &'static str = ".scrumforge/agents";

    /// Worktree metadata directory.
    pub const WORKTREES_DIR: &'static str = ".scrumforge/worktrees";

    /// Pre-write snapshot directory.
    pub const BACKUPS_DIR: &'static str = ".scrumforge/backups";

    /// SchemaError quarantine directory.
    pub const QUARANTINE_DIR: &'static str = ".scrumforge/backups/quarantine";

    /// Git worktree checkouts, one per active task.
    pub const TREES_DIR: &'static str = "trees";
}

/// Checks whether the current directory has been initialized.
pub fn is_initialized() -> bool {
    Path::new(Paths::STATE_ROOT).exists()
}

/// Resolves the state root as an absolute-relative `PathBuf` from `project_root`.
pub fn state_root(project_root: impl AsRef<Path>) -> PathBuf {
    project_root.as_ref().join(Paths::STATE_ROOT)
}

/// Ensure directory exists.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_constants() {
        assert_eq!(Paths::STATE_ROOT, ".scrumforge");
        assert_eq!(Paths::CONFIG, ".scrumforge/config");
        assert_eq!(Paths::DATA_DIR, ".scrumforge/data");
    }

    #[test]
    fn state_root_joins_project_root() {
        assert_eq!(state_root("/tmp/proj"), PathBuf::from("/tmp/proj/.scrumforge"));
    }
}
