use colored::*;

use super::facade::{manager, open_project};
use crate::EpicCommands;

pub async fn run(cmd: EpicCommands) -> anyhow::Result<()> {
    let project = open_project()?;
    let mgr = manager(&project);

    match cmd {
        EpicCommands::Create { title, theme, business_value } => {
            let epic = mgr.create_epic(title, theme, business_value)?;
            println!("{} {}", "created".green(), epic.id.bright_blue());
        }
        EpicCommands::List => {
            let epics = mgr.list_epics()?;
            if epics.is_empty() {
                println!("{}", "No epics yet.".yellow());
                return Ok(());
            }
            for epic in epics {
                println!(
                    "{} {} ({} stories) - {}",
                    epic.id.bright_blue(),
                    epic.title,
                    epic.story_ids.len(),
                    epic.theme.bright_black()
                );
            }
        }
        EpicCommands::AddStory { epic_id, story_id } => {
            let epic = mgr.add_story_to_epic(&epic_id, &story_id)?;
            println!("{} {} added to {}", "✓".green(), story_id.bright_blue(), epic.id.bright_blue());
        }
    }

    Ok(())
}
