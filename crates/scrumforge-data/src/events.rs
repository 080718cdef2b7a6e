//! Event stream: a typed, synchronous, in-order notification surface.
//! Consumers register a callback on the façade; nothing in the core writes
//! to the terminal directly (formatting is the CLI's job).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScrumEvent {
    SprintStarted {
        sprint_id: String,
        task_count: usize,
        at: DateTime<Utc>,
    },
    TaskClaimed {
        task_id: String,
        agent_name: String,
        confidence: f64,
        at: DateTime<Utc>,
    },
    AgentTakeover {
        task_id: String,
        agent_name: String,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        task_id: String,
        phase: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        coverage_percent: Option<f64>,
        pr_url: Option<String>,
        at: DateTime<Utc>,
    },
    TaskFailed {
        task_id: String,
        reason: String,
        at: DateTime<Utc>,
    },
    Handoff {
        from_agent: Option<String>,
        to_agent: String,
        reason: String,
        at: DateTime<Utc>,
    },
    SprintCompleted {
        sprint_id: String,
        completed_count: usize,
        at: DateTime<Utc>,
    },
    Error {
        message: String,
        kind: String,
        at: DateTime<Utc>,
    },
}

/// Registered on the façade; delivery is synchronous and in-order per §6.
pub type EventSink = Box<dyn Fn(&ScrumEvent) + Send + Sync>;

/// A trivially-cloneable wrapper so orchestrator/executor layers can hold
/// an optional sink without threading `Option<&dyn Fn>` through call sites.
#[derive(Default)]
pub struct EventBus {
    sink: Option<EventSink>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus { sink: None }
    }

    pub fn with_sink(sink: EventSink) -> Self {
        EventBus { sink: Some(sink) }
    }

    pub fn publish(&self, event: ScrumEvent) {
        if let Some(sink) = &self.sink {
            sink(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
