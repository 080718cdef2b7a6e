//! Records every shell invocation the executor makes, including exit
//! statuses and stdout excerpts, to a per-sprint JSONL log.
//!
//! One JSONL file per run, append-only, flushed per write, guarded by a
//! `Mutex`. The record type is a flat `InvocationRecord` describing a
//! single tool invocation (command, exit status, output excerpt) rather
//! than a chat-completion-stream event enum.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use scrumforge_data::ScrumResult;
use serde::{Deserialize, Serialize};

const EXCERPT_LIMIT: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub task_id: String,
    pub tool: String,
    pub command: String,
    pub success: bool,
    pub output_excerpt: String,
    pub at: DateTime<Utc>,
}

impl InvocationRecord {
    pub fn new(task_id: &str, tool: &str, command: &str, success: bool, output: &str) -> Self {
        let excerpt: String = output.chars().take(EXCERPT_LIMIT).collect();
        InvocationRecord {
            task_id: task_id.to_string(),
            tool: tool.to_string(),
            command: command.to_string(),
            success,
            output_excerpt: excerpt,
            at: Utc::now(),
        }
    }
}

/// Append-only JSONL sink for `InvocationRecord`s, one file per sprint.
pub struct InvocationLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl InvocationLog {
    pub fn open(sprint_id: &str, state_root: impl AsRef<Path>) -> ScrumResult<Self> {
        let path = state_root
            .as_ref()
            .join("logs")
            .join(format!("sprint-{sprint_id}.jsonl"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(InvocationLog {
            file: Mutex::new(file),
            path,
        })
    }

    pub fn record(&self, record: InvocationRecord) {
        let Ok(json) = serde_json::to_string(&record) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{json}");
            let _ = file.flush();
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_append_as_jsonl() {
        let dir = tempdir().unwrap();
        let log = InvocationLog::open("SPRINT-ABC123", dir.path()).unwrap();
        log.record(InvocationRecord::new("TASK-000001", "test", "pytest", true, "ok"));
        log.record(InvocationRecord::new("TASK-000001", "coverage", "pytest --cov", true, "92%"));

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn excerpt_is_truncated() {
        let long_output = "x".repeat(5000);
        let record = InvocationRecord::new("TASK-000001", "test", "pytest", true, &long_output);
        assert_eq!(record.output_excerpt.len(), EXCERPT_LIMIT);
    }
}
