use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epic {
    pub id: String,
    pub title: String,
    pub theme: String,

    #[serde(default)]
    pub business_value: String,

    #[serde(default)]
    pub story_ids: Vec<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    Planned,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub target_date: DateTime<Utc>,

    #[serde(default)]
    pub story_ids: Vec<String>,

    #[serde(default)]
    pub status: MilestoneStatus,
}

impl Default for MilestoneStatus {
    fn default() -> Self {
        MilestoneStatus::Planned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub id: String,
    pub name: String,
    pub milestones: Vec<Milestone>,
    pub created_at: DateTime<Utc>,
}

impl Roadmap {
    /// The create-project operation auto-seeds a roadmap with four
    /// milestones spanning 16 weeks (§3 Roadmap).
    pub fn seed_default(id: String, project_name: &str) -> Self {
        let now = Utc::now();
        let week = chrono::Duration::weeks(4);
        Roadmap {
            id,
            name: format!("{project_name} Roadmap"),
            milestones: vec![
                Milestone {
                    name: "Foundation".to_string(),
                    target_date: now + week,
                    story_ids: vec![],
                    status: MilestoneStatus::Planned,
                },
                Milestone {
                    name: "Core Features".to_string(),
                    target_date: now + week * 2,
                    story_ids: vec![],
                    status: MilestoneStatus::Planned,
                },
                Milestone {
                    name: "Hardening".to_string(),
                    target_date: now + week * 3,
                    story_ids: vec![],
                    status: MilestoneStatus::Planned,
                },
                Milestone {
                    name: "Launch".to_string(),
                    target_date: now + week * 4,
                    story_ids: vec![],
                    status: MilestoneStatus::Planned,
                },
            ],
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_spans_four_milestones() {
        let roadmap = Roadmap::seed_default("ROADMAP-000001".into(), "Demo");
        assert_eq!(roadmap.milestones.len(), 4);
        let span = roadmap.milestones.last().unwrap().target_date - roadmap.created_at;
        assert_eq!(span.num_weeks(), 16);
    }
}
