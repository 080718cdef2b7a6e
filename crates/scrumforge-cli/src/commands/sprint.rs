use colored::*;

use super::facade::{manager, open_project};
use crate::SprintCommands;

pub async fn run(cmd: SprintCommands) -> anyhow::Result<()> {
    let project = open_project()?;
    let mgr = manager(&project);

    match cmd {
        SprintCommands::Plan { name, goal, duration_days } => {
            let sprint = mgr.plan_sprint(name, goal, duration_days)?;
            println!(
                "{} {} ({} items, {} pts committed)",
                "planned".green(),
                sprint.id.bright_blue(),
                sprint.committed_items.len(),
                sprint.velocity_target
            );
        }
        SprintCommands::Start { sprint_id } => {
            let sprint = mgr.start_sprint(&sprint_id)?;
            println!("{} {} started", "▶".bright_green(), sprint.id.bright_blue());
            println!("  run {} to drive it to completion", format!("scrumforge run {}", sprint.id).bright_blue());
        }
        SprintCommands::Complete { sprint_id, retrospective } => {
            let sprint = mgr.complete_sprint(&sprint_id, retrospective)?;
            println!("{} {} completed", "■".bright_green().bold(), sprint.id.bright_blue());
        }
        SprintCommands::List => {
            let sprints = mgr.list_sprints()?;
            if sprints.is_empty() {
                println!("{}", "No sprints yet.".yellow());
                return Ok(());
            }
            for sprint in sprints {
                println!(
                    "{} [{:?}] {} - {}",
                    sprint.id.bright_blue(),
                    sprint.status,
                    sprint.name,
                    sprint.goal
                );
            }
        }
        SprintCommands::Show { sprint_id } => {
            let sprint = mgr.get_sprint(&sprint_id)?;
            println!("{}: {}", "id".bold(), sprint.id.bright_blue());
            println!("{}: {}", "name".bold(), sprint.name);
            println!("{}: {}", "goal".bold(), sprint.goal);
            println!("{}: {:?}", "status".bold(), sprint.status);
            println!("{}: {}", "committed items".bold(), sprint.committed_items.len());
            if let Some(started) = sprint.start_date {
                println!("{}: {}", "started".bold(), started.format("%Y-%m-%d %H:%M"));
            }
            if let Some(ended) = sprint.end_date {
                println!("{}: {}", "ends".bold(), ended.format("%Y-%m-%d %H:%M"));
            }
            if !sprint.burndown.is_empty() {
                println!("{}:", "burndown".bold());
                for point in &sprint.burndown {
                    println!("  {} - {:.1} pts remaining", point.at.format("%Y-%m-%d %H:%M"), point.points_remaining);
                }
            }
            if let Some(notes) = &sprint.retrospective_notes {
                println!("{}: {}", "retrospective".bold(), notes);
            }
        }
        SprintCommands::Velocity { n } => {
            let velocity = mgr.velocity(n)?;
            println!("{}: {:.1} points/sprint (last {} sprints)", "velocity".bold(), velocity, n);
        }
    }

    Ok(())
}
