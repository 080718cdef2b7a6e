use colored::*;

use super::args::parse_priority;
use super::facade::{manager, open_project};
use crate::StoryCommands;

pub async fn run(cmd: StoryCommands) -> anyhow::Result<()> {
    let project = open_project()?;
    let mgr = manager(&project);

    match cmd {
        StoryCommands::Create {
            title,
            role,
            want,
            benefit,
            acceptance_criteria,
            priority,
        } => {
            let priority = parse_priority(&priority)?;
            let story = mgr.create_story(title, role, want, benefit, acceptance_criteria, priority, None)?;
            println!("{} {}", "created".green(), story.id.bright_blue());
            println!("  {}", story.narrative());
        }
        StoryCommands::List => {
            let stories = mgr.list_stories()?;
            if stories.is_empty() {
                println!("{}", "No stories yet.".yellow());
                return Ok(());
            }
            for story in stories {
                let points = story.story_points.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string());
                println!(
                    "{} [{:?}] {} ({} pts) - {}",
                    story.id.bright_blue(),
                    story.status,
                    story.title,
                    points,
                    format!("{:?}", story.priority).bright_black()
                );
            }
        }
        StoryCommands::Estimate { story_id, points, all } => {
            if all {
                let unestimated: Vec<_> = mgr.list_stories()?.into_iter().filter(|s| s.story_points.is_none()).collect();
                if unestimated.is_empty() {
                    println!("{}", "Nothing to estimate.".yellow());
                    return Ok(());
                }
                for story in unestimated {
                    let story = mgr.estimate_story(&story.id, None)?;
                    println!(
                        "{} {} estimated at {} points",
                        "✓".green(),
                        story.id.bright_blue(),
                        story.story_points.unwrap_or(0)
                    );
                }
                return Ok(());
            }

            let story_id = story_id.ok_or_else(|| anyhow::anyhow!("story_id is required unless --all is given"))?;
            let story = mgr.estimate_story(&story_id, points)?;
            println!(
                "{} {} estimated at {} points",
                "✓".green(),
                story.id.bright_blue(),
                story.story_points.unwrap_or(0)
            );
        }
    }

    Ok(())
}
