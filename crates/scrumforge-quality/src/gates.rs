//! Concrete gates: one struct per check, with `is_critical` controlling
//! whether a failure halts the pipeline. Covers the coverage-threshold gate
//! and the dependency-cycle-rejection check that guards sprint planning.

use super::pipeline::{GateContext, GateResult, QualityGate};
use super::schema_validator::SchemaValidator;
use scrumforge_data::ScrumResult;
use std::collections::{HashMap, HashSet};

/// §4.7 "A task is Completed only if the coverage tool reports ≥ the
/// configured threshold." The reading itself comes from the executor; this
/// gate only judges it.
pub struct CoverageGate;

impl QualityGate for CoverageGate {
    fn name(&self) -> &str {
        "Coverage Threshold"
    }

    fn run(&self, context: &GateContext) -> ScrumResult<GateResult> {
        match context.coverage_percent {
            None => Ok(GateResult::fail(
                self.name().to_string(),
                vec!["no coverage reading available".to_string()],
            )),
            Some(percent) if percent >= context.coverage_required as f64 => {
                Ok(GateResult::pass(self.name().to_string()).with_message(format!(
                    "coverage {percent:.1}% meets threshold {}%",
                    context.coverage_required
                )))
            }
            Some(percent) => Ok(GateResult::fail(
                self.name().to_string(),
                vec![format!(
                    "coverage {percent:.1}% below required {}%",
                    context.coverage_required
                )],
            )),
        }
    }

    fn is_critical(&self) -> bool {
        true
    }
}

/// Validates every agent descriptor file in `context.agent_descriptor_paths`
/// against the embedded schema (§4.4: "duplicates are refused" is enforced
/// by the registry; this gate only checks shape).
pub struct AgentDescriptorSchemaGate;

impl QualityGate for AgentDescriptorSchemaGate {
    fn name(&self) -> &str {
        "Agent Descriptor Schema"
    }

    fn run(&self, context: &GateContext) -> ScrumResult<GateResult> {
        if context.agent_descriptor_paths.is_empty() {
            return Ok(GateResult::pass(self.name().to_string())
                .with_message("no descriptors to validate".to_string()));
        }

        let mut errors = Vec::new();
        for path in &context.agent_descriptor_paths {
            let validation = SchemaValidator::validate_agent_descriptor(path)?;
            if !validation.is_valid() {
                for err in validation.errors {
                    errors.push(format!("{}: {}: {}", path.display(), err.path, err.message));
                }
            }
        }

        if errors.is_empty() {
            Ok(GateResult::pass(self.name().to_string())
                .with_message(format!("{} descriptor(s) conform to schema", context.agent_descriptor_paths.len())))
        } else {
            Ok(GateResult::fail(self.name().to_string(), errors))
        }
    }

    fn is_critical(&self) -> bool {
        true
    }
}

/// §4.8 "Cycles are rejected before the sprint becomes Active." Runs a
/// depth-first search over the task dependency graph and reports the first
/// cycle found.
pub struct DependencyCycleGate;

impl QualityGate for DependencyCycleGate {
    fn name(&self) -> &str {
        "Dependency Cycle Detection"
    }

    fn run(&self, context: &GateContext) -> ScrumResult<GateResult> {
        let by_id: HashMap<&str, &scrumforge_data::Task> =
            context.tasks.iter().map(|t| (t.id.as_str(), t)).collect();

        for task in &context.tasks {
            if let Some(cycle) = find_cycle(&task.id, &by_id) {
                return Ok(GateResult::fail(
                    self.name().to_string(),
                    vec![format!("dependency cycle detected: {}", cycle.join(" -> "))],
                ));
            }
        }

        Ok(GateResult::pass(self.name().to_string())
            .with_message("no dependency cycles".to_string()))
    }

    fn is_critical(&self) -> bool {
        true
    }
}

fn find_cycle(start: &str, by_id: &HashMap<&str, &scrumforge_data::Task>) -> Option<Vec<String>> {
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    walk(start, by_id, &mut visited, &mut path)
}

fn walk(
    id: &str,
    by_id: &HashMap<&str, &scrumforge_data::Task>,
    visited: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    if path.iter().any(|p| p == id) {
        path.push(id.to_string());
        return Some(path.clone());
    }
    if visited.contains(id) {
        return None;
    }
    visited.insert(id.to_string());
    path.push(id.to_string());

    if let Some(task) = by_id.get(id) {
        for dep in &task.dependencies {
            if let Some(cycle) = walk(dep, by_id, visited, path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    None
}

/// Default pipeline: schema validation and cycle detection run before a
/// sprint starts; coverage is checked per-task by the executor.
pub fn create_default_pipeline() -> super::pipeline::QualityPipeline {
    super::pipeline::QualityPipeline::new()
        .add_gate(AgentDescriptorSchemaGate)
        .add_gate(DependencyCycleGate)
        .add_gate(CoverageGate)
        .stop_on_failure(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scrumforge_data::{Priority, Task, TaskStatus};
    use std::path::PathBuf;

    fn task(id: &str, deps: Vec<&str>) -> Task {
        Task {
            id: id.to_string(),
            story_id: "US-000001".to_string(),
            title: "t".to_string(),
            description: String::new(),
            technical_details: String::new(),
            estimated_hours: 4.0,
            status: TaskStatus::Pending,
            assigned_agent: None,
            test_criteria: vec![],
            dependencies: deps.into_iter().map(String::from).collect(),
            priority: Priority::Medium,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn cycle_gate_passes_acyclic_graph() {
        let tasks = vec![task("TASK-A", vec![]), task("TASK-B", vec!["TASK-A"])];
        let context = GateContext::new(PathBuf::from(".")).with_tasks(tasks);
        let result = DependencyCycleGate.run(&context).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn cycle_gate_detects_cycle() {
        let tasks = vec![task("TASK-A", vec!["TASK-B"]), task("TASK-B", vec!["TASK-A"])];
        let context = GateContext::new(PathBuf::from(".")).with_tasks(tasks);
        let result = DependencyCycleGate.run(&context).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn coverage_gate_fails_below_threshold() {
        let context = GateContext::new(PathBuf::from(".")).with_coverage(Some(82.0), 100);
        let result = CoverageGate.run(&context).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn coverage_gate_passes_at_threshold() {
        let context = GateContext::new(PathBuf::from(".")).with_coverage(Some(100.0), 100);
        let result = CoverageGate.run(&context).unwrap();
        assert!(result.passed);
    }
}
