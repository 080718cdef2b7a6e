use colored::*;
use scrumforge_git::WorktreeManager;

use super::facade::open_project;

pub async fn run(task_filter: Option<String>) -> anyhow::Result<()> {
    let project = open_project()?;
    let manager = WorktreeManager::new(".", project.state_root.as_path(), project.config.project.abbrev.as_str())?;

    let mut records = manager.list()?;
    if let Some(task_id) = &task_filter {
        records.retain(|r| &r.task_id == task_id);
    }

    if records.is_empty() {
        println!("{}", "No worktrees found.".yellow());
        return Ok(());
    }

    println!("{} worktree(s):\n", records.len());
    for record in records {
        println!("{}", "────────────────────────────────────────".bright_black());
        println!("{}: {}", "task".bold(), record.task_id.bright_blue());
        println!("{}: {}", "branch".bold(), record.branch.bright_green());
        println!("{}: {}", "path".bold(), record.path);
        println!("{}: {:?}", "status".bold(), record.status);
        if let Some(url) = &record.pr_url {
            println!("{}: {}", "pr".bold(), url);
        }
        println!();
    }

    Ok(())
}
