use colored::*;

use super::args::{parse_priority, parse_severity};
use super::facade::{manager, open_project};
use crate::BugCommands;

pub async fn run(cmd: BugCommands) -> anyhow::Result<()> {
    let project = open_project()?;
    let mgr = manager(&project);

    match cmd {
        BugCommands::Create {
            title,
            description,
            steps_to_reproduce,
            expected,
            actual,
            severity,
            priority,
        } => {
            let severity = parse_severity(&severity)?;
            let priority = parse_priority(&priority)?;
            let bug = mgr.create_bug(title, description, steps_to_reproduce, expected, actual, severity, priority, None)?;
            println!(
                "{} {} ({} pts, {:?} severity)",
                "reported".green(),
                bug.id.bright_blue(),
                bug.story_points.unwrap_or(0),
                bug.severity
            );
        }
        BugCommands::List => {
            let bugs = mgr.list_bugs()?;
            if bugs.is_empty() {
                println!("{}", "No bugs reported.".yellow());
                return Ok(());
            }
            for bug in bugs {
                println!(
                    "{} [{:?}] {} ({:?}/{:?})",
                    bug.id.bright_blue(),
                    bug.status,
                    bug.title,
                    bug.severity,
                    bug.priority
                );
            }
        }
    }

    Ok(())
}
