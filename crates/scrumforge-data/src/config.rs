use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ScrumResult;

/// Project configuration, loaded from `<state-root>/config` as TOML. Every
/// field carries a `serde(default)` so a partially hand-edited config file
/// degrades gracefully.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub scrum: ScrumConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub worktrees: WorktreesConfig,
    #[serde(default)]
    pub pr: PrConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> ScrumResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::error::ScrumError::schema("config", e.to_string()))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ScrumResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ScrumError::schema("config", e.to_string()))?;
        crate::persistence::atomic_write(path.as_ref(), content.as_bytes())?;
        Ok(())
    }

    pub fn for_new_project(name: &str) -> Self {
        let mut config = Config::default();
        config.project.name = name.to_string();
        config.project.abbrev = derive_abbrev(name);
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbrev: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: String::new(),
            abbrev: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrumConfig {
    #[serde(default = "default_velocity_target")]
    pub velocity_target: u32,
    #[serde(default = "default_sprint_duration_days")]
    pub default_sprint_duration_days: u32,
    #[serde(default = "default_strict_mode")]
    pub strict_mode: bool,
    #[serde(default = "default_test_coverage_required")]
    pub test_coverage_required: u32,
}

fn default_velocity_target() -> u32 {
    20
}
fn default_sprint_duration_days() -> u32 {
    14
}
fn default_strict_mode() -> bool {
    true
}
fn default_test_coverage_required() -> u32 {
    100
}

impl Default for ScrumConfig {
    fn default() -> Self {
        ScrumConfig {
            velocity_target: default_velocity_target(),
            default_sprint_duration_days: default_sprint_duration_days(),
            strict_mode: default_strict_mode(),
            test_coverage_required: default_test_coverage_required(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_allow_dynamic_creation")]
    pub allow_dynamic_creation: bool,
}

fn default_allow_dynamic_creation() -> bool {
    true
}

impl Default for AgentsConfig {
    fn default() -> Self {
        AgentsConfig {
            allow_dynamic_creation: default_allow_dynamic_creation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorktreesConfig {
    #[serde(default = "default_worktrees_root")]
    pub root: String,
}

fn default_worktrees_root() -> String {
    "trees".to_string()
}

impl Default for WorktreesConfig {
    fn default() -> Self {
        WorktreesConfig {
            root: default_worktrees_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrConfig {
    #[serde(default = "default_pr_tool")]
    pub tool: String,
    #[serde(default = "default_pr_base_branch")]
    pub base_branch: String,
}

fn default_pr_tool() -> String {
    "gh".to_string()
}
fn default_pr_base_branch() -> String {
    "main".to_string()
}

impl Default for PrConfig {
    fn default() -> Self {
        PrConfig {
            tool: default_pr_tool(),
            base_branch: default_pr_base_branch(),
        }
    }
}

/// Derives a 4-letter uppercase project abbreviation when `project.abbrev`
/// is absent (§3 Git Worktree Manager's `<PROJ>` branch component).
pub fn derive_abbrev(project_name: &str) -> String {
    let letters: String = project_name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_uppercase();

    if letters.len() >= 4 {
        letters.chars().take(4).collect()
    } else if letters.is_empty() {
        "PROJ".to_string()
    } else {
        format!("{letters:0<4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbrev_from_short_name() {
        assert_eq!(derive_abbrev("go"), "GO00");
    }

    #[test]
    fn abbrev_truncates_long_name() {
        assert_eq!(derive_abbrev("storefront-api"), "STOR");
    }

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.scrum.velocity_target, 20);
        assert_eq!(cfg.scrum.default_sprint_duration_days, 14);
        assert!(cfg.scrum.strict_mode);
        assert_eq!(cfg.scrum.test_coverage_required, 100);
        assert!(cfg.agents.allow_dynamic_creation);
        assert_eq!(cfg.worktrees.root, "trees");
        assert_eq!(cfg.pr.tool, "gh");
        assert_eq!(cfg.pr.base_branch, "main");
    }
}
