use colored::*;
use scrumforge_agents::{AgentRegistry, InvocationLog};
use scrumforge_core::SprintOrchestrator;
use scrumforge_git::WorktreeManager;

use super::facade::{console_events, open_project};

pub async fn run(sprint_id: String) -> anyhow::Result<()> {
    let project = open_project()?;
    let events = console_events();
    let mgr = scrumforge_core::ScrumManager::new(project.state_root.as_path(), project.config.clone(), events);

    let registry = AgentRegistry::load(project.state_root.join("agents"))?;
    let worktrees = WorktreeManager::new(".", project.state_root.as_path(), project.config.project.abbrev.as_str())?;
    let log = InvocationLog::open(&sprint_id, project.state_root.as_path())?;

    let mut orchestrator = SprintOrchestrator::new(&mgr, registry, worktrees, mgr.events(), &log);
    let summary = orchestrator.run(&sprint_id)?;

    if summary.halted {
        println!("{} sprint {} halted after {} tasks", "!".red().bold(), summary.sprint_id.bright_blue(), summary.completed_count);
    } else {
        println!(
            "{} sprint {} finished ({} tasks completed)",
            "✓".green().bold(),
            summary.sprint_id.bright_blue(),
            summary.completed_count
        );
    }

    Ok(())
}
