use colored::*;
use scrumforge_data::Config;
use scrumforge_utils::Paths;
use std::path::Path;

pub async fn run(name: Option<String>) -> anyhow::Result<()> {
    println!("{}", "Initializing SCRUMForge project...".bright_cyan().bold());

    if Path::new(Paths::STATE_ROOT).exists() {
        println!("{}", format!("Already initialized. Remove {} to reinitialize.", Paths::STATE_ROOT).yellow());
        return Ok(());
    }

    let project_name = name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string())
    });

    std::fs::create_dir_all(Paths::DATA_DIR)?;
    std::fs::create_dir_all(Paths::AGENTS_DIR)?;
    std::fs::create_dir_all(Paths::WORKTREES_DIR)?;
    std::fs::create_dir_all(Paths::BACKUPS_DIR)?;
    std::fs::create_dir_all(Paths::QUARANTINE_DIR)?;

    let config = Config::for_new_project(&project_name);
    config.save(Paths::CONFIG)?;

    let events = scrumforge_data::EventBus::with_sink(Box::new(|_| {}));
    let mgr = scrumforge_core::ScrumManager::new(Paths::STATE_ROOT, config.clone(), events);
    let roadmap = mgr.seed_roadmap(&project_name)?;

    if !Path::new(".gitignore").exists() {
        std::fs::write(".gitignore", "trees/\n")?;
    } else {
        let existing = std::fs::read_to_string(".gitignore")?;
        if !existing.lines().any(|l| l.trim() == "trees/") {
            std::fs::write(".gitignore", format!("{}\ntrees/\n", existing.trim_end()))?;
        }
    }

    println!("\n{}", "Project initialized.".green().bold());
    println!("  {}: {}", "name".bright_white(), project_name.bright_blue());
    println!("  {}: {}", "abbrev".bright_white(), config.project.abbrev.bright_blue());
    println!("  {}: {} ({} milestones)", "roadmap".bright_white(), roadmap.id.bright_blue(), roadmap.milestones.len());
    println!("\n{}", "Next steps:".bright_white().bold());
    println!("  1. {}", "scrumforge story create \"...\" --role ... --want ... --benefit ...".bright_blue());
    println!("  2. {}", "scrumforge sprint plan <name> <goal>".bright_blue());
    println!("  3. {}", "scrumforge sprint start <sprint-id>".bright_blue());

    Ok(())
}
