use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::common::{lenient_status_enum, Priority};

lenient_status_enum! {
    pub enum TaskStatus {
        Pending,
        InProgress,
        Testing,
        Completed,
        Blocked,
    }
    permissive = Pending;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub story_id: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub technical_details: String,

    #[serde(default = "default_estimated_hours")]
    pub estimated_hours: f64,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub assigned_agent: Option<String>,

    #[serde(default)]
    pub test_criteria: Vec<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub priority: Priority,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_estimated_hours() -> f64 {
    4.0
}

impl Task {
    /// Text the matcher (§4.5) scans for technology and task-type hints.
    pub fn match_text(&self) -> (String, String, String) {
        (
            self.title.to_lowercase(),
            self.description.to_lowercase(),
            self.technical_details.to_lowercase(),
        )
    }

    /// §3 invariant: a task may enter In Progress only once every
    /// dependency is Completed.
    pub fn dependencies_satisfied(&self, completed: &dyn Fn(&str) -> bool) -> bool {
        self.dependencies.iter().all(|dep| completed(dep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hours_is_four() {
        assert_eq!(default_estimated_hours(), 4.0);
    }

    #[test]
    fn dependency_check() {
        let task = Task {
            id: "TASK-000001".into(),
            story_id: "US-000001".into(),
            title: "t".into(),
            description: String::new(),
            technical_details: String::new(),
            estimated_hours: 4.0,
            status: TaskStatus::Pending,
            assigned_agent: None,
            test_criteria: vec![],
            dependencies: vec!["TASK-000002".into()],
            priority: Priority::Medium,
            created_at: Utc::now(),
            completed_at: None,
        };
        assert!(!task.dependencies_satisfied(&|_| false));
        assert!(task.dependencies_satisfied(&|_| true));
    }
}
