use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorktreeStatus {
    Active,
    Pushed,
    PrOpen,
    Abandoned,
    Removed,
}

/// §3 Worktree record, persisted under `worktrees/metadata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorktreeRecord {
    pub task_id: String,
    pub agent_name: String,
    pub branch: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub status: WorktreeStatus,

    #[serde(default)]
    pub pr_url: Option<String>,
}
