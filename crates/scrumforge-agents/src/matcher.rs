//! Task-Agent Matcher: scores a task's title/description/technical-details
//! text against each registered agent's file patterns, skill keywords, and
//! language, and creates a descriptor on demand when nothing scores above
//! threshold. The on-demand descriptor builder follows the small
//! per-technology field table pattern used for specialist templates in
//! `other_examples/29554c20_odgrim-abathur-swarm__src-domain-models-specialist_templates.rs.rs`
//! rather than a single fixed template.

use scrumforge_data::{AgentDescriptor, Task};

/// Outcome of matching a task to an agent.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub agent_name: String,
    pub reason: String,
    pub confidence: f64,
    pub created_new: bool,
}

struct TechHit {
    agent_name: &'static str,
    weight: u32,
}

const TECH_MAP: &[(&str, &str)] = &[
    ("python", "python"), ("django", "python"), ("flask", "python"), ("fastapi", "python"),
    ("go", "go"), ("golang", "go"), ("gin", "go"),
    ("react", "frontend"), ("vue", "frontend"), ("angular", "frontend"),
    ("typescript", "frontend"), ("javascript", "frontend"),
    ("docker", "devops"), ("kubernetes", "devops"), ("terraform", "devops"),
    ("postgres", "database"), ("mongo", "database"), ("sql", "database"),
    ("pytest", "test-runner"), ("jest", "test-runner"), ("unittest", "test-runner"), ("coverage", "test-runner"),
    ("rails", "ruby"), ("ruby", "ruby"),
    ("spring", "java"), ("java", "java"),
    ("rust", "rust"), ("cargo", "rust"),
    ("swift", "swift"), ("ios", "swift"),
    ("kotlin", "kotlin"), ("android", "kotlin"),
    ("elixir", "elixir"), ("phoenix", "elixir"),
    ("r", "r"), ("ggplot", "r"),
    ("haskell", "haskell"), ("cabal", "haskell"),
];

const TASK_TYPE_MAP: &[(&str, &str)] = &[
    ("test", "test-runner"), ("coverage", "test-runner"),
    ("deploy", "devops"), ("pipeline", "devops"),
    ("refactor", "project-manager"), ("review", "project-manager"),
];

/// Scans `title`/`description`/`technical_details` for technology
/// keywords, scoring title matches highest.
fn scan_tech(title: &str, description: &str, technical_details: &str) -> Vec<TechHit> {
    let mut hits = Vec::new();
    for (term, agent_name) in TECH_MAP {
        let mut weight = 0;
        if title.contains(term) {
            weight += 3;
        }
        if technical_details.contains(term) {
            weight += 2;
        }
        if description.contains(term) {
            weight += 1;
        }
        if weight > 0 {
            hits.push(TechHit { agent_name, weight });
        }
    }
    hits
}

fn scan_task_type(title: &str, description: &str, technical_details: &str) -> Vec<TechHit> {
    let mut hits = Vec::new();
    for (term, agent_name) in TASK_TYPE_MAP {
        let mut weight = 0;
        if title.contains(term) {
            weight += 2;
        }
        if technical_details.contains(term) {
            weight += 1;
        }
        if description.contains(term) {
            weight += 1;
        }
        if weight > 0 {
            hits.push(TechHit { agent_name, weight });
        }
    }
    hits
}

/// Best-scoring agent name(s), tied candidates first, title-hit flag.
fn best_candidates(hits: &[TechHit]) -> (Vec<(&'static str, u32)>, bool) {
    let top = hits.iter().map(|h| h.weight).max().unwrap_or(0);
    let within_band = hits
        .iter()
        .filter(|h| (top as f64 - h.weight as f64) <= (top as f64 * 0.1).max(0.0001))
        .map(|h| (h.agent_name, h.weight))
        .collect();
    (within_band, top >= 3)
}

/// Matches a task to an agent. `workload` reports the count of currently
/// Pending/InProgress tasks assigned to a candidate, for workload
/// balancing among near-tied candidates (step 6). `registry_contains` and
/// `on_demand_create` let the caller supply registry lookups without this
/// module depending on `AgentRegistry` directly.
pub fn match_task(
    task: &Task,
    workload: &dyn Fn(&str) -> usize,
    registry_contains: &dyn Fn(&str) -> bool,
    on_demand_create: &dyn Fn(&str) -> Option<AgentDescriptor>,
    allow_dynamic_creation: bool,
) -> MatchResult {
    if let Some(manual) = &task.assigned_agent {
        return MatchResult {
            agent_name: manual.clone(),
            reason: "manual".to_string(),
            confidence: 1.0,
            created_new: false,
        };
    }

    let (title, description, technical_details) = task.match_text();

    let tech_hits = scan_tech(&title, &description, &technical_details);
    let (mut candidates, had_title_hit) = best_candidates(&tech_hits);
    let mut reason = "technology match".to_string();
    let mut top_score = tech_hits.iter().map(|h| h.weight).max().unwrap_or(0);

    if candidates.is_empty() {
        let type_hits = scan_task_type(&title, &description, &technical_details);
        let (type_candidates, _) = best_candidates(&type_hits);
        candidates = type_candidates;
        top_score = type_hits.iter().map(|h| h.weight).max().unwrap_or(0);
        reason = "task-type match".to_string();
    }

    if candidates.is_empty() {
        return MatchResult {
            agent_name: "engineer".to_string(),
            reason: "no signal, generic fallback".to_string(),
            confidence: 0.25,
            created_new: false,
        };
    }

    // Step 6: workload balancing among near-tied candidates.
    candidates.sort_by_key(|(name, _)| workload(name));
    let (chosen_name, _) = candidates[0];

    let confidence = if had_title_hit {
        (top_score as f64 / 3.0).min(1.0)
    } else {
        (top_score as f64 / 4.0).min(0.75)
    };

    if registry_contains(chosen_name) {
        return MatchResult {
            agent_name: chosen_name.to_string(),
            reason,
            confidence,
            created_new: false,
        };
    }

    if allow_dynamic_creation {
        if let Some(descriptor) = on_demand_create(chosen_name) {
            return MatchResult {
                agent_name: descriptor.name,
                reason: format!("{reason}, created on demand"),
                confidence,
                created_new: true,
            };
        }
    }

    MatchResult {
        agent_name: "engineer".to_string(),
        reason: "on-demand creation failed, generic fallback".to_string(),
        confidence: 0.25,
        created_new: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scrumforge_data::{Priority, TaskStatus};

    fn task(title: &str, description: &str) -> Task {
        Task {
            id: "TASK-000001".to_string(),
            story_id: "US-000001".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            technical_details: String::new(),
            estimated_hours: 4.0,
            status: TaskStatus::Pending,
            assigned_agent: None,
            test_criteria: vec![],
            dependencies: vec![],
            priority: Priority::Medium,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn manual_override_wins() {
        let mut t = task("anything", "");
        t.assigned_agent = Some("rust".to_string());
        let result = match_task(&t, &|_| 0, &|_| true, &|_| None, true);
        assert_eq!(result.agent_name, "rust");
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.reason, "manual");
    }

    #[test]
    fn title_hit_picks_technology() {
        let t = task("Add Python FastAPI endpoint", "implements a REST route");
        let result = match_task(&t, &|_| 0, &|_| true, &|_| None, true);
        assert_eq!(result.agent_name, "python");
        assert!(result.confidence >= 0.99);
    }

    #[test]
    fn no_signal_falls_back_to_generic() {
        let t = task("Update documentation", "fix a typo");
        let result = match_task(&t, &|_| 0, &|_| true, &|_| None, true);
        assert_eq!(result.agent_name, "engineer");
        assert_eq!(result.confidence, 0.25);
    }

    #[test]
    fn task_type_hit_used_when_no_technology() {
        let t = task("Write coverage for module", "needs test coverage");
        let result = match_task(&t, &|_| 0, &|_| true, &|_| None, true);
        assert_eq!(result.agent_name, "test-runner");
    }

    #[test]
    fn workload_balances_near_tied_candidates() {
        let t = task("python and go script", "");
        let result = match_task(&t, &|name| if name == "python" { 5 } else { 0 }, &|_| true, &|_| None, true);
        assert_eq!(result.agent_name, "go");
    }

    #[test]
    fn template_for_technology_prefers_built_in_roster() {
        let descriptor = template_for_technology("python").unwrap();
        assert_eq!(descriptor.display_name, "Python Engineer");
        assert!(descriptor.skill_keywords.contains(&"pytest".to_string()));
    }

    #[test]
    fn template_for_technology_falls_back_outside_roster() {
        let descriptor = template_for_technology("scala").unwrap();
        assert_eq!(descriptor.language, "scala");
        assert!(template_for_technology("cobol").is_none());
    }

    #[test]
    fn on_demand_creation_used_when_not_registered() {
        let t = task("Write Elixir Phoenix handler", "");
        let result = match_task(
            &t,
            &|_| 0,
            &|_| false,
            &|name| {
                Some(AgentDescriptor {
                    name: name.to_string(),
                    display_name: name.to_string(),
                    color: String::new(),
                    emoji: String::new(),
                    short_label: String::new(),
                    language: name.to_string(),
                    frameworks: vec![],
                    file_patterns: vec![],
                    skill_keywords: vec![],
                    allowed_tools: vec![],
                    test_command: None,
                    coverage_command: None,
                    lint_command: None,
                })
            },
            true,
        );
        assert_eq!(result.agent_name, "elixir");
        assert!(result.created_new);
    }
}

/// Template for a technology the matcher scored against, keyed by the same
/// agent name `TECH_MAP`/`TASK_TYPE_MAP` produce. Tries the built-in roster
/// first — this is what is actually reached when a descriptor has been
/// deleted from the registry and needs recreating — then falls back to a
/// small table of technologies entirely outside that roster.
pub fn template_for_technology(tech: &str) -> Option<AgentDescriptor> {
    if let Some(descriptor) = crate::registry::built_in_descriptors()
        .into_iter()
        .find(|d| d.name == tech)
    {
        return Some(descriptor);
    }

    let (display_name, language) = match tech {
        "scala" => ("Scala Engineer", "scala"),
        "dart" => ("Dart Engineer", "dart"),
        "perl" => ("Perl Engineer", "perl"),
        "lua" => ("Lua Engineer", "lua"),
        "zig" => ("Zig Engineer", "zig"),
        _ => return None,
    };
    Some(AgentDescriptor {
        name: tech.to_string(),
        display_name: display_name.to_string(),
        color: "white".to_string(),
        emoji: String::new(),
        short_label: tech.chars().take(4).collect(),
        language: language.to_string(),
        frameworks: vec![],
        file_patterns: vec![],
        skill_keywords: vec![],
        allowed_tools: vec![],
        test_command: None,
        coverage_command: None,
        lint_command: None,
    })
}
