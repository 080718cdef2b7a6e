use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::common::{lenient_status_enum, Priority, Severity};

lenient_status_enum! {
    pub enum BugStatus {
        Open,
        InProgress,
        Resolved,
        Closed,
    }
    permissive = Open;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bug {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub steps_to_reproduce: Vec<String>,

    #[serde(default)]
    pub expected: String,

    #[serde(default)]
    pub actual: String,

    pub severity: Severity,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: BugStatus,

    #[serde(default)]
    pub story_points: Option<u8>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bug {
    /// §4.3 create_bug: auto-assigns points from severity if unset.
    pub fn effective_points(&self) -> u8 {
        self.story_points.unwrap_or_else(|| self.severity.default_story_points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_points_from_severity() {
        let mut bug = sample();
        bug.severity = Severity::Critical;
        bug.story_points = None;
        assert_eq!(bug.effective_points(), 8);
    }

    #[test]
    fn explicit_points_win() {
        let mut bug = sample();
        bug.story_points = Some(2);
        assert_eq!(bug.effective_points(), 2);
    }

    fn sample() -> Bug {
        Bug {
            id: "BUG-000001".into(),
            title: "t".into(),
            description: String::new(),
            steps_to_reproduce: vec![],
            expected: String::new(),
            actual: String::new(),
            severity: Severity::Medium,
            priority: Priority::Medium,
            status: BugStatus::Open,
            story_points: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
