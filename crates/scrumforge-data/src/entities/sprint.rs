use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::common::lenient_status_enum;

lenient_status_enum! {
    pub enum SprintStatus {
        Planned,
        Active,
        Completed,
        Cancelled,
    }
    permissive = Planned;
}

/// Kind discriminant for a committed backlog item (§3 Sprint.committed_items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Story,
    Bug,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedItem {
    pub kind: ItemKind,
    pub id: String,
}

/// One sample of the burndown time-series: points remaining as of `at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurndownPoint {
    pub at: DateTime<Utc>,
    pub points_remaining: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub goal: String,

    #[serde(default = "default_duration_days")]
    pub duration_days: u32,

    #[serde(default)]
    pub status: SprintStatus,

    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub committed_items: Vec<CommittedItem>,

    #[serde(default)]
    pub velocity_target: u32,

    #[serde(default)]
    pub burndown: Vec<BurndownPoint>,

    #[serde(default)]
    pub retrospective_notes: Option<String>,

    /// Handoff log entries (§4.8), appended as the orchestrator runs.
    #[serde(default)]
    pub handoffs: Vec<Handoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handoff {
    pub from_agent: Option<String>,
    pub to_agent: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

fn default_duration_days() -> u32 {
    14
}

impl Sprint {
    pub fn is_active(&self) -> bool {
        matches!(self.status, SprintStatus::Active)
    }

    pub fn record_burndown(&mut self, points_remaining: f64) {
        self.burndown.push(BurndownPoint {
            at: Utc::now(),
            points_remaining,
        });
    }

    pub fn record_handoff(&mut self, from_agent: Option<String>, to_agent: &str, reason: &str) {
        self.handoffs.push(Handoff {
            from_agent,
            to_agent: to_agent.to_string(),
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_duration_is_two_weeks() {
        assert_eq!(default_duration_days(), 14);
    }

    #[test]
    fn active_check() {
        let mut s = sample();
        assert!(!s.is_active());
        s.status = SprintStatus::Active;
        assert!(s.is_active());
    }

    fn sample() -> Sprint {
        Sprint {
            id: "SPRINT-000001".into(),
            name: "Sprint 1".into(),
            goal: "ship".into(),
            duration_days: 14,
            status: SprintStatus::Planned,
            start_date: None,
            end_date: None,
            committed_items: vec![],
            velocity_target: 20,
            burndown: vec![],
            retrospective_notes: None,
            handoffs: vec![],
        }
    }
}
