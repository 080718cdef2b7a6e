use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::common::{lenient_status_enum, Priority};

lenient_status_enum! {
    pub enum StoryStatus {
        Backlog,
        Ready,
        InProgress,
        Done,
        Blocked,
    }
    permissive = Backlog;
}

/// Fibonacci-valued story points. `None` means not yet estimated.
pub type StoryPoints = Option<u8>;

pub const FIBONACCI_POINTS: [u8; 7] = [1, 2, 3, 5, 8, 13, 21];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub want: String,
    #[serde(default)]
    pub benefit: String,

    #[serde(default)]
    pub acceptance_criteria: Vec<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: StoryStatus,

    #[serde(default)]
    pub story_points: StoryPoints,

    #[serde(default)]
    pub epic_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// A story description assembled in the conventional "As a ... I want
    /// ... so that ..." form, used as estimation input (§4.3).
    pub fn narrative(&self) -> String {
        format!("{} {} {}", self.role, self.want, self.benefit)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// A story is only eligible for sprint planning once estimated and
    /// sitting in Backlog.
    pub fn is_plannable(&self) -> bool {
        matches!(self.status, StoryStatus::Backlog) && self.story_points.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_degrades_to_backlog() {
        let json = r#""in-review""#;
        let status: StoryStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status, StoryStatus::Backlog);
    }

    #[test]
    fn known_status_round_trips() {
        let json = serde_json::to_string(&StoryStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: StoryStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, StoryStatus::InProgress);
    }
}
