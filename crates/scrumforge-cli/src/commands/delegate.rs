use colored::*;
use scrumforge_agents::{AgentRegistry, InvocationLog, TaskOutcome};
use scrumforge_core::SprintOrchestrator;
use scrumforge_git::WorktreeManager;

use super::facade::{console_events, open_project};

/// Matches and executes exactly one task outside of a sprint run, per the
/// `delegate(task_id)` façade operation.
pub async fn run(task_id: String) -> anyhow::Result<()> {
    let project = open_project()?;
    let events = console_events();
    let mgr = scrumforge_core::ScrumManager::new(project.state_root.as_path(), project.config.clone(), events);

    let registry = AgentRegistry::load(project.state_root.join("agents"))?;
    let worktrees = WorktreeManager::new(".", project.state_root.as_path(), project.config.project.abbrev.as_str())?;
    let log = InvocationLog::open(&task_id, project.state_root.as_path())?;

    let mut orchestrator = SprintOrchestrator::new(&mgr, registry, worktrees, mgr.events(), &log);
    let result = orchestrator.delegate(&task_id)?;

    match result.status {
        TaskOutcome::Completed => {
            println!("{} {} completed: {}", "✓".green().bold(), task_id.bright_blue(), result.summary);
        }
        TaskOutcome::Failed | TaskOutcome::Blocked => {
            println!("{} {} not completed: {}", "!".red().bold(), task_id.bright_blue(), result.summary);
        }
    }

    Ok(())
}
