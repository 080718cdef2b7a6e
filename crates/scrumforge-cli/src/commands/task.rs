use colored::*;

use super::args::parse_priority;
use super::facade::{manager, open_project};
use crate::TaskCommands;

pub async fn run(cmd: TaskCommands) -> anyhow::Result<()> {
    let project = open_project()?;
    let mgr = manager(&project);

    match cmd {
        TaskCommands::Create {
            story_id,
            title,
            description,
            technical_details,
            hours,
            dependencies,
            priority,
        } => {
            let priority = parse_priority(&priority)?;
            let task = mgr.create_task(story_id, title, description, technical_details, hours, vec![], dependencies, priority)?;
            println!("{} {}", "created".green(), task.id.bright_blue());
        }
        TaskCommands::List => {
            let tasks = mgr.list_tasks()?;
            if tasks.is_empty() {
                println!("{}", "No tasks yet.".yellow());
                return Ok(());
            }
            for task in tasks {
                let agent = task.assigned_agent.as_deref().unwrap_or("unassigned");
                println!(
                    "{} [{:?}] {} - {} ({})",
                    task.id.bright_blue(),
                    task.status,
                    task.title,
                    agent.bright_cyan(),
                    format!("{:?}", task.priority).bright_black()
                );
            }
        }
        TaskCommands::Assign { task_id, agent_name } => {
            let task = mgr.assign_agent(&task_id, agent_name)?;
            println!(
                "{} {} assigned to {}",
                "✓".green(),
                task.id.bright_blue(),
                task.assigned_agent.as_deref().unwrap_or("?").bright_cyan()
            );
        }
    }

    Ok(())
}
