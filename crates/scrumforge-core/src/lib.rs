pub mod jira_sync;
pub mod manager;
pub mod orchestrator;

pub use jira_sync::{InboundItemUpdate, InboundQueue, OutboundHook};
pub use manager::ScrumManager;
pub use orchestrator::{OrchestratorState, SprintOrchestrator, SprintRunSummary};
