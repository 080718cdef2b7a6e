//! Shared bootstrap for every subcommand: check the state directory exists,
//! load the project config, and hand back a `ScrumManager` plus the state
//! root it was built from. Distills the "check state dir, load config"
//! preamble that would otherwise be repeated at the top of every
//! `commands::*::run`.

use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::*;
use scrumforge_data::{Config, EventBus};
use scrumforge_utils::Paths;

pub struct Project {
    pub state_root: PathBuf,
    pub config: Config,
}

/// Opens the project rooted at the current directory, publishing events to
/// stdout via a plain formatter.
pub fn open_project() -> anyhow::Result<Project> {
    if !scrumforge_utils::is_initialized() {
        bail!(
            "{}\nRun {} first.",
            "Project not initialized.".red(),
            "scrumforge init".bright_blue()
        );
    }

    let state_root = PathBuf::from(Paths::STATE_ROOT);
    let config = Config::load(state_root.join("config")).context("failed to load project config")?;
    Ok(Project { state_root, config })
}

pub fn manager(project: &Project) -> scrumforge_core::ScrumManager {
    scrumforge_core::ScrumManager::new(project.state_root.as_path(), project.config.clone(), console_events())
}

/// An `EventBus` that prints every event to stdout as a colored status
/// line. Used by commands that drive a sprint run.
pub fn console_events() -> EventBus {
    EventBus::with_sink(Box::new(|event| print_event(event)))
}

fn print_event(event: &scrumforge_data::ScrumEvent) {
    use scrumforge_data::ScrumEvent::*;
    match event {
        SprintStarted { sprint_id, task_count, .. } => {
            println!("{} sprint {} ({} tasks)", "▶".bright_green(), sprint_id.bright_blue(), task_count);
        }
        TaskClaimed { task_id, agent_name, confidence, .. } => {
            println!(
                "  {} {} claimed by {} ({:.0}% confidence)",
                "→".bright_black(),
                task_id.bright_blue(),
                agent_name.bright_cyan(),
                confidence * 100.0
            );
        }
        AgentTakeover { task_id, agent_name, .. } => {
            println!("  {} {} takes over {}", "●".bright_cyan(), agent_name, task_id.bright_blue());
        }
        PhaseChanged { task_id, phase, .. } => {
            println!("    {} {}: {}", "·".bright_black(), task_id, phase);
        }
        TaskCompleted { task_id, coverage_percent, pr_url, .. } => {
            let coverage = coverage_percent.map(|c| format!("{c:.1}%")).unwrap_or_else(|| "n/a".to_string());
            println!("  {} {} completed (coverage {})", "✓".green(), task_id.bright_blue(), coverage);
            if let Some(url) = pr_url {
                println!("    {} {}", "pr:".bright_black(), url);
            }
        }
        TaskFailed { task_id, reason, .. } => {
            println!("  {} {} failed: {}", "✗".red(), task_id.bright_blue(), reason);
        }
        Handoff { from_agent, to_agent, reason, .. } => {
            let from = from_agent.as_deref().unwrap_or("none");
            println!("  {} handoff {} -> {} ({})", "⇄".yellow(), from, to_agent, reason);
        }
        SprintCompleted { sprint_id, completed_count, .. } => {
            println!("{} sprint {} completed ({} items)", "■".bright_green().bold(), sprint_id.bright_blue(), completed_count);
        }
        Error { message, kind, .. } => {
            println!("{} [{}] {}", "!".red().bold(), kind, message);
        }
    }
}
