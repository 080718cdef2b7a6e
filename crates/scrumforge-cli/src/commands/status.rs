use colored::*;
use scrumforge_data::{SprintStatus, StoryStatus};

use super::facade::{manager, open_project};

pub async fn run(json: bool) -> anyhow::Result<()> {
    let project = open_project()?;
    let mgr = manager(&project);

    let stories = mgr.list_stories()?;
    let tasks = mgr.list_tasks()?;
    let bugs = mgr.list_bugs()?;
    let sprints = mgr.list_sprints()?;
    let velocity = mgr.velocity(3)?;

    if json {
        let report = serde_json::json!({
            "project": project.config.project.name,
            "stories": stories.len(),
            "tasks": tasks.len(),
            "bugs": bugs.len(),
            "sprints": sprints.len(),
            "velocity": velocity,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "SCRUMForge Status".bright_cyan().bold());
    println!("{}: {}", "project".bold(), project.config.project.name.bright_blue());
    println!();

    let active = sprints.iter().find(|s| s.status == SprintStatus::Active);
    match active {
        Some(sprint) => println!("{}: {} - {}", "active sprint".bold(), sprint.id.bright_green(), sprint.goal),
        None => println!("{}: {}", "active sprint".bold(), "none".yellow()),
    }
    println!("{}: {:.1} pts/sprint", "velocity (last 3)".bold(), velocity);
    println!();

    let done = stories.iter().filter(|s| s.status == StoryStatus::Done).count();
    println!(
        "{}: {} total, {} done, {} ready",
        "stories".bold(),
        stories.len(),
        done,
        stories.iter().filter(|s| s.status == StoryStatus::Ready).count()
    );
    println!("{}: {} total", "tasks".bold(), tasks.len());
    println!(
        "{}: {} open, {} total",
        "bugs".bold(),
        bugs.iter().filter(|b| matches!(b.status, scrumforge_data::BugStatus::Open)).count(),
        bugs.len()
    );

    Ok(())
}
