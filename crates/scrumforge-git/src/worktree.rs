//! Git Worktree Manager: one worktree per task under
//! `<project>/trees/<slug>/`, backed by a branch `<type>/<PROJ>-<n>`.
//!
//! Holds a git2 `Repository` alongside `std::process::Command::new("git")`
//! shell-outs for the worktree subcommands git2 doesn't expose, keyed by
//! task id rather than sprint number, with a persisted branch counter per
//! project abbreviation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use git2::Repository;
use scrumforge_data::{EntityStore, ScrumError, ScrumResult, WorktreeRecord, WorktreeStatus};

const IGNORE_MARKER: &str = "trees/";

/// Kind of branch a worktree is created for, per the item it backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Feature,
    Fix,
    Refactor,
}

impl BranchKind {
    fn as_str(self) -> &'static str {
        match self {
            BranchKind::Feature => "feature",
            BranchKind::Fix => "fix",
            BranchKind::Refactor => "refactor",
        }
    }
}

/// Result of `status()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorktreeStatusReport {
    pub has_changes: bool,
    pub commits_ahead: usize,
    pub commits_behind: usize,
}

pub struct WorktreeManager {
    repo_path: PathBuf,
    repo: Repository,
    trees_root: PathBuf,
    project_abbrev: String,
    store: EntityStore<WorktreeRecord>,
    counter_path: PathBuf,
}

impl WorktreeManager {
    pub fn new(
        repo_path: impl Into<PathBuf>,
        state_root: impl Into<PathBuf>,
        project_abbrev: impl Into<String>,
    ) -> ScrumResult<Self> {
        let repo_path = repo_path.into();
        let state_root = state_root.into();
        let repo = Repository::open(&repo_path)
            .map_err(|e| ScrumError::dependency(format!("not a git repository: {e}")))?;
        Ok(WorktreeManager {
            trees_root: repo_path.join("trees"),
            repo_path,
            repo,
            project_abbrev: project_abbrev.into(),
            store: EntityStore::new(state_root.join("worktrees").join("metadata")),
            counter_path: state_root.join("worktrees").join("branch_counter"),
        })
    }

    /// The repository root this manager operates on.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Idempotent mkdir + add to the repository's ignore file.
    pub fn ensure_trees_root(&self) -> ScrumResult<()> {
        std::fs::create_dir_all(&self.trees_root)?;
        let exclude_path = self.repo_path.join(".git").join("info").join("exclude");
        let existing = std::fs::read_to_string(&exclude_path).unwrap_or_default();
        if !existing.lines().any(|l| l.trim() == IGNORE_MARKER) {
            if let Some(parent) = exclude_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut updated = existing;
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(IGNORE_MARKER);
            updated.push('\n');
            std::fs::write(&exclude_path, updated)?;
        }
        Ok(())
    }

    fn next_branch_number(&self) -> ScrumResult<u32> {
        let current: u32 = std::fs::read_to_string(&self.counter_path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        let next = current + 1;
        scrumforge_data::atomic_write(&self.counter_path, next.to_string().as_bytes())?;
        Ok(next)
    }

    fn load_records(&self) -> ScrumResult<BTreeMap<String, WorktreeRecord>> {
        self.store.load()
    }

    fn save_records(&self, records: &BTreeMap<String, WorktreeRecord>) -> ScrumResult<()> {
        self.store.save(records)
    }

    /// Creates a worktree for `task_id`, refusing if one already exists.
    pub fn create(
        &self,
        task_id: &str,
        agent_name: &str,
        kind: BranchKind,
    ) -> ScrumResult<(PathBuf, String)> {
        self.ensure_trees_root()?;
        let mut records = self.load_records()?;
        if records.contains_key(task_id) {
            return Err(ScrumError::conflict(format!(
                "worktree already exists for task {task_id}"
            )));
        }

        let n = self.next_branch_number()?;
        let branch = format!("{}/{}-{n}", kind.as_str(), self.project_abbrev);
        let slug = slugify(task_id);
        let path = self.trees_root.join(&slug);

        let head = self
            .repo
            .head()
            .map_err(|e| ScrumError::dependency(format!("no HEAD to branch from: {e}")))?;
        let head_commit = head
            .peel_to_commit()
            .map_err(|e| ScrumError::dependency(format!("HEAD is not a commit: {e}")))?;
        self.repo
            .branch(&branch, &head_commit, false)
            .map_err(|e| ScrumError::dependency(format!("failed to create branch {branch}: {e}")))?;

        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(["worktree", "add", path.to_str().unwrap_or_default(), &branch])
            .output()
            .map_err(|e| ScrumError::subprocess("git", e.to_string()))?;
        if !output.status.success() {
            return Err(ScrumError::subprocess(
                "git",
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let record = WorktreeRecord {
            task_id: task_id.to_string(),
            agent_name: agent_name.to_string(),
            branch: branch.clone(),
            path: path.display().to_string(),
            created_at: Utc::now(),
            status: WorktreeStatus::Active,
            pr_url: None,
        };
        records.insert(task_id.to_string(), record);
        self.save_records(&records)?;

        Ok((path, branch))
    }

    /// Enumerates live worktrees via `git worktree list --porcelain`,
    /// reconciled against persisted metadata. Records whose path no longer
    /// has a live worktree are marked `removed` rather than dropped.
    pub fn list(&self) -> ScrumResult<Vec<WorktreeRecord>> {
        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(["worktree", "list", "--porcelain"])
            .output()
            .map_err(|e| ScrumError::subprocess("git", e.to_string()))?;
        if !output.status.success() {
            return Err(ScrumError::subprocess(
                "git",
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let live_paths: Vec<String> = stdout
            .lines()
            .filter_map(|l| l.strip_prefix("worktree "))
            .map(|p| p.to_string())
            .collect();

        let mut records = self.load_records()?;
        let mut changed = false;
        for record in records.values_mut() {
            let still_live = live_paths.iter().any(|p| p == &record.path);
            if !still_live && record.status != WorktreeStatus::Removed {
                record.status = WorktreeStatus::Removed;
                changed = true;
            }
        }
        if changed {
            self.save_records(&records)?;
        }
        Ok(records.into_values().collect())
    }

    /// `git status --porcelain` and `rev-list` against the task's branch.
    pub fn status(&self, task_id: &str) -> ScrumResult<WorktreeStatusReport> {
        let records = self.load_records()?;
        let record = records
            .get(task_id)
            .ok_or_else(|| ScrumError::not_found("worktree", task_id))?;

        let status_output = Command::new("git")
            .current_dir(&record.path)
            .args(["status", "--porcelain"])
            .output()
            .map_err(|e| ScrumError::subprocess("git", e.to_string()))?;
        let has_changes = !status_output.stdout.is_empty();

        let rev_list_output = Command::new("git")
            .current_dir(&record.path)
            .args([
                "rev-list",
                "--left-right",
                "--count",
                &format!("HEAD...{}", record.branch),
            ])
            .output();
        let (commits_ahead, commits_behind) = match rev_list_output {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout);
                let mut parts = text.split_whitespace();
                let ahead = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                let behind = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                (ahead, behind)
            }
            _ => (0, 0),
        };

        Ok(WorktreeStatusReport {
            has_changes,
            commits_ahead,
            commits_behind,
        })
    }

    /// Refuses to remove a worktree with uncommitted changes unless `force`.
    pub fn remove(&self, task_id: &str, force: bool) -> ScrumResult<()> {
        let report = self.status(task_id)?;
        if report.has_changes && !force {
            return Err(ScrumError::conflict(format!(
                "worktree for {task_id} has uncommitted changes; pass force to remove anyway"
            )));
        }

        let mut records = self.load_records()?;
        let record = records
            .get(task_id)
            .ok_or_else(|| ScrumError::not_found("worktree", task_id))?
            .clone();

        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&record.path);
        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(&args)
            .output()
            .map_err(|e| ScrumError::subprocess("git", e.to_string()))?;
        if !output.status.success() {
            return Err(ScrumError::subprocess(
                "git",
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        if let Some(record) = records.get_mut(task_id) {
            record.status = WorktreeStatus::Removed;
        }
        self.save_records(&records)?;
        Ok(())
    }

    /// `git push -u origin <branch>`; sets status to pushed on success.
    pub fn push(&self, task_id: &str) -> ScrumResult<()> {
        let mut records = self.load_records()?;
        let record = records
            .get(task_id)
            .ok_or_else(|| ScrumError::not_found("worktree", task_id))?
            .clone();

        let output = Command::new("git")
            .current_dir(&record.path)
            .args(["push", "-u", "origin", &record.branch])
            .output()
            .map_err(|e| ScrumError::subprocess("git", e.to_string()))?;
        if !output.status.success() {
            return Err(ScrumError::subprocess(
                "git",
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        if let Some(record) = records.get_mut(task_id) {
            record.status = WorktreeStatus::Pushed;
        }
        self.save_records(&records)?;
        Ok(())
    }

    /// Invokes the configured PR tool (default `gh`). On failure, returns
    /// the error without changing persisted state.
    pub fn open_pr(
        &self,
        task_id: &str,
        title: &str,
        body: &str,
        tool: &str,
        base_branch: &str,
    ) -> ScrumResult<String> {
        let mut records = self.load_records()?;
        let record = records
            .get(task_id)
            .ok_or_else(|| ScrumError::not_found("worktree", task_id))?
            .clone();

        let output = Command::new(tool)
            .current_dir(&record.path)
            .args([
                "pr",
                "create",
                "--title",
                title,
                "--body",
                body,
                "--base",
                base_branch,
                "--head",
                &record.branch,
            ])
            .output()
            .map_err(|e| ScrumError::subprocess(tool, e.to_string()))?;
        if !output.status.success() {
            return Err(ScrumError::subprocess(
                tool,
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if let Some(record) = records.get_mut(task_id) {
            record.status = WorktreeStatus::PrOpen;
            record.pr_url = Some(url.clone());
        }
        self.save_records(&records)?;
        Ok(url)
    }

    /// Prunes ghost worktree entries and, optionally, worktrees for
    /// completed tasks with no uncommitted changes. `is_completed` lets the
    /// caller (the SCRUM Manager) decide which task ids are done without
    /// this crate depending on task state directly.
    pub fn cleanup(
        &self,
        remove_completed: bool,
        is_completed: &dyn Fn(&str) -> bool,
    ) -> ScrumResult<usize> {
        let prune_output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(["worktree", "prune"])
            .output()
            .map_err(|e| ScrumError::subprocess("git", e.to_string()))?;
        if !prune_output.status.success() {
            return Err(ScrumError::subprocess(
                "git",
                String::from_utf8_lossy(&prune_output.stderr).to_string(),
            ));
        }

        let records = self.list()?;
        let mut removed = 0usize;
        for record in records {
            if record.status == WorktreeStatus::Removed {
                continue;
            }
            if remove_completed && is_completed(&record.task_id) {
                if let Ok(report) = self.status(&record.task_id) {
                    if !report.has_changes {
                        self.remove(&record.task_id, false)?;
                        removed += 1;
                    }
                }
            }
        }
        Ok(removed)
    }
}

fn slugify(task_id: &str) -> String {
    task_id
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as Cmd;
    use tempfile::tempdir;

    fn init_repo(dir: &Path) {
        Cmd::new("git").arg("init").current_dir(dir).output().unwrap();
        Cmd::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(dir)
            .output()
            .unwrap();
        Cmd::new("git")
            .args(["config", "user.name", "test"])
            .current_dir(dir)
            .output()
            .unwrap();
        std::fs::write(dir.join("README.md"), "hello").unwrap();
        Cmd::new("git").args(["add", "."]).current_dir(dir).output().unwrap();
        Cmd::new("git")
            .args(["commit", "-m", "init"])
            .current_dir(dir)
            .output()
            .unwrap();
    }

    #[test]
    fn create_refuses_duplicate_for_same_task() {
        let repo_dir = tempdir().unwrap();
        init_repo(repo_dir.path());
        let state_dir = tempdir().unwrap();
        let manager = WorktreeManager::new(repo_dir.path(), state_dir.path(), "PROJ").unwrap();

        let (_, branch) = manager.create("TASK-AAA001", "python", BranchKind::Feature).unwrap();
        assert!(branch.starts_with("feature/PROJ-"));

        let err = manager.create("TASK-AAA001", "python", BranchKind::Feature).unwrap_err();
        assert_eq!(err.kind(), scrumforge_data::ErrorKind::Conflict);
    }

    #[test]
    fn branch_numbers_increment_per_project() {
        let repo_dir = tempdir().unwrap();
        init_repo(repo_dir.path());
        let state_dir = tempdir().unwrap();
        let manager = WorktreeManager::new(repo_dir.path(), state_dir.path(), "PROJ").unwrap();

        let (_, first) = manager.create("TASK-AAA001", "python", BranchKind::Feature).unwrap();
        let (_, second) = manager.create("TASK-AAA002", "go", BranchKind::Fix).unwrap();
        assert_ne!(first, second);
        assert!(second.starts_with("fix/PROJ-"));
    }

    #[test]
    fn list_reconciles_removed_worktrees() {
        let repo_dir = tempdir().unwrap();
        init_repo(repo_dir.path());
        let state_dir = tempdir().unwrap();
        let manager = WorktreeManager::new(repo_dir.path(), state_dir.path(), "PROJ").unwrap();
        manager.create("TASK-AAA001", "python", BranchKind::Feature).unwrap();

        manager.remove("TASK-AAA001", true).unwrap();
        let records = manager.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, WorktreeStatus::Removed);
    }
}
