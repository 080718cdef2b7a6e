use colored::*;
use scrumforge_agents::AgentRegistry;

use super::facade::open_project;

pub async fn run(detailed: bool) -> anyhow::Result<()> {
    let project = open_project()?;
    let registry = AgentRegistry::load(project.state_root.join("agents"))?;

    let mut descriptors = registry.list();
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));

    println!("{}", "Registered agents".bright_cyan().bold());
    for descriptor in descriptors {
        println!("{} - {}", descriptor.name.bright_blue(), descriptor.display_name);
        if detailed {
            println!("    language: {}", descriptor.language);
            if !descriptor.frameworks.is_empty() {
                println!("    frameworks: {}", descriptor.frameworks.join(", "));
            }
            if !descriptor.skill_keywords.is_empty() {
                println!("    keywords: {}", descriptor.skill_keywords.join(", "));
            }
        }
    }

    Ok(())
}
