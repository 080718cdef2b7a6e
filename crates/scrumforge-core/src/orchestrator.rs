//! Sprint Orchestrator: drives one `Active` sprint's frozen task set
//! to completion, one task at a time.
//!
//! Walks a dependency-ordered task queue rather than a fixed phase
//! sequence, since this domain's unit of work is a `Task` with explicit
//! `dependencies`. Keeps a retry-then-give-up shape per task and saves
//! state after each step; there is no parallel-sprint path, since only one
//! `Active` sprint exists at a time.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use scrumforge_agents::{match_task, template_for_technology, AgentExecutor, InvocationLog, TaskOutcome};
use scrumforge_data::{
    AgentDescriptor, EventBus, ItemKind, ScrumError, ScrumEvent, ScrumResult, SprintStatus, Story,
    StoryStatus, Task, TaskStatus,
};
use scrumforge_git::{BranchKind, WorktreeManager};
use scrumforge_quality::{DependencyCycleGate, GateContext, QualityPipeline};

use crate::manager::{priority_rank, ScrumManager};

/// Orchestrator lifecycle state, per §4.8's state diagram:
/// `Idle -> Starting -> Running -> (Draining -> Finalizing)? -> Idle`, with
/// a `Halted` terminal reached from `Running` on a fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Starting,
    Running,
    Draining,
    Finalizing,
    Halted,
}

#[derive(Debug, Clone)]
pub struct SprintRunSummary {
    pub sprint_id: String,
    pub completed_count: usize,
    pub halted: bool,
}

/// Builds a frozen, dependency-ordered list of task ids from `tasks`, using
/// Kahn's algorithm with ties broken by priority then id. Errors if the
/// given set contains a cycle.
fn topological_order(tasks: &[Task]) -> ScrumResult<Vec<String>> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut remaining_deps: HashMap<String, usize> = HashMap::new();
    for t in tasks {
        let count = t.dependencies.iter().filter(|d| by_id.contains_key(d.as_str())).count();
        remaining_deps.insert(t.id.clone(), count);
    }

    let mut order = Vec::with_capacity(tasks.len());
    loop {
        let mut ready: Vec<&str> = remaining_deps
            .iter()
            .filter(|&(id, &count)| count == 0 && !order.contains(id))
            .map(|(id, _)| id.as_str())
            .collect();
        if ready.is_empty() {
            break;
        }
        ready.sort_by_key(|id| (priority_rank(by_id[id].priority), id.to_string()));
        let next = ready[0].to_string();
        order.push(next.clone());

        for t in tasks {
            if t.dependencies.iter().any(|d| d == &next) {
                if let Some(count) = remaining_deps.get_mut(&t.id) {
                    *count = count.saturating_sub(1);
                }
            }
        }
    }

    if order.len() != tasks.len() {
        return Err(ScrumError::dependency("dependency cycle detected in frozen task set"));
    }
    Ok(order)
}

/// Infers the worktree branch kind from the item the task serves. Stories
/// back feature work; a title or description mentioning "fix"/"bug" backs a
/// fix branch. §4.6 names `Refactor` as a third kind but gives no signal to
/// derive it from automatically, so it is reserved for manual
/// `assign_agent`-driven overrides rather than ever chosen here.
fn branch_kind_for(task: &Task) -> BranchKind {
    let text = format!("{} {}", task.title, task.description).to_lowercase();
    if text.contains("fix") || text.contains("bug") {
        BranchKind::Fix
    } else {
        BranchKind::Feature
    }
}

fn pr_title(task: &Task) -> String {
    format!("[{}] {}", task.id, task.title)
}

fn pr_body(task: &Task, result: &scrumforge_agents::TaskResult) -> String {
    format!(
        "Task: {}\nAssigned agent: {}\nCoverage: {}\n\n{}",
        task.id,
        task.assigned_agent.as_deref().unwrap_or("unassigned"),
        result
            .coverage_percent
            .map(|c| format!("{c:.1}%"))
            .unwrap_or_else(|| "n/a".to_string()),
        result.summary,
    )
}

pub struct SprintOrchestrator<'a> {
    manager: &'a ScrumManager,
    registry: scrumforge_agents::AgentRegistry,
    worktrees: WorktreeManager,
    executor: AgentExecutor<'a>,
    events: &'a EventBus,
    state: OrchestratorState,
}

impl<'a> SprintOrchestrator<'a> {
    pub fn new(
        manager: &'a ScrumManager,
        registry: scrumforge_agents::AgentRegistry,
        worktrees: WorktreeManager,
        events: &'a EventBus,
        log: &'a InvocationLog,
    ) -> Self {
        SprintOrchestrator {
            manager,
            registry,
            worktrees,
            executor: AgentExecutor::new(events, log),
            events,
            state: OrchestratorState::Idle,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Starts `sprint_id` and drives its frozen task set to completion or
    /// to a halt, per §4.8's Running loop (select next ready task, match an
    /// agent, acquire a worktree, delegate, record the outcome, repeat).
    /// At most one task is ever `InProgress` at a time: each iteration
    /// blocks on `AgentExecutor::execute` before considering the next.
    pub fn run(&mut self, sprint_id: &str) -> ScrumResult<SprintRunSummary> {
        self.state = OrchestratorState::Starting;
        let sprint = self.manager.get_sprint(sprint_id)?;
        if !matches!(sprint.status, SprintStatus::Planned) {
            return Err(ScrumError::conflict(format!("sprint {sprint_id} is not Planned")));
        }

        let mut tasks = self.manager.load_tasks()?;
        let mut stories = self.manager.load_stories()?;

        let story_ids: HashSet<&str> = sprint
            .committed_items
            .iter()
            .filter(|item| item.kind == ItemKind::Story)
            .map(|item| item.id.as_str())
            .collect();

        let unit_tasks: Vec<Task> = tasks
            .values()
            .filter(|t| story_ids.contains(t.story_id.as_str()))
            .cloned()
            .collect();

        // §4.8: "cycles are rejected before the sprint becomes Active." Run
        // the cycle gate against the frozen task set, and freeze the
        // dependency order, before `start_sprint` ever touches the sprint's
        // on-disk status.
        let gate_context = GateContext::new(self.worktrees.repo_path().to_path_buf()).with_tasks(unit_tasks.clone());
        let report = QualityPipeline::new().add_gate(DependencyCycleGate).run(&gate_context)?;
        if !report.passed {
            self.state = OrchestratorState::Halted;
            return Err(ScrumError::dependency("dependency cycle detected; sprint not started"));
        }

        let order = topological_order(&unit_tasks)?;

        self.manager.start_sprint(sprint_id)?;

        self.state = OrchestratorState::Running;
        let mut halted = false;
        let mut completed_count = 0usize;
        let mut last_agent: Option<String> = None;

        loop {
            let pending: Vec<String> = order
                .iter()
                .filter(|id| matches!(tasks.get(id.as_str()).map(|t| t.status), Some(TaskStatus::Pending)))
                .cloned()
                .collect();
            if pending.is_empty() {
                break;
            }

            let ready = pending.iter().find(|id| {
                let task = &tasks[id.as_str()];
                task.dependencies_satisfied(&|dep| matches!(tasks.get(dep).map(|t| t.status), Some(TaskStatus::Completed)))
            }).cloned();

            let Some(task_id) = ready else {
                self.events.publish(ScrumEvent::Error {
                    message: format!("dependency deadlock: {} pending task(s) with unmet dependencies", pending.len()),
                    kind: "DependencyError".to_string(),
                    at: Utc::now(),
                });
                halted = true;
                break;
            };

            let result = self.delegate_one(&task_id, &mut tasks, &mut stories, &mut last_agent, Some(sprint_id))?;

            match result.status {
                TaskOutcome::Completed => completed_count += 1,
                TaskOutcome::Failed | TaskOutcome::Blocked => {
                    if self.manager.config().scrum.strict_mode {
                        halted = true;
                        break;
                    }
                }
            }
        }

        self.manager.save_stories(&stories)?;

        if halted {
            self.state = OrchestratorState::Halted;
            return Ok(SprintRunSummary {
                sprint_id: sprint_id.to_string(),
                completed_count,
                halted: true,
            });
        }

        self.state = OrchestratorState::Draining;
        let final_tasks = self.manager.load_tasks()?;
        let _ = self.worktrees.cleanup(true, &|id| matches!(final_tasks.get(id).map(|t| t.status), Some(TaskStatus::Completed)));

        self.state = OrchestratorState::Finalizing;
        let final_sprint = self.manager.complete_sprint(sprint_id, None)?;

        self.state = OrchestratorState::Idle;
        Ok(SprintRunSummary {
            sprint_id: final_sprint.id,
            completed_count,
            halted: false,
        })
    }

    /// Matches an agent to `task_id`, acquires a worktree, runs the
    /// test-first sequence, and applies the outcome to `tasks`/`stories`.
    /// Shared by the sprint `run()` loop and the standalone `delegate()`
    /// façade operation. `sprint_id`, when given, additionally records the
    /// handoff and burndown on that sprint; `delegate()` passes `None`
    /// since it has no sprint to update.
    fn delegate_one(
        &mut self,
        task_id: &str,
        tasks: &mut BTreeMap<String, Task>,
        stories: &mut BTreeMap<String, Story>,
        last_agent: &mut Option<String>,
        sprint_id: Option<&str>,
    ) -> ScrumResult<scrumforge_agents::TaskResult> {
        let task_snapshot = tasks[task_id].clone();

        let mut assigned_counts: HashMap<String, usize> = HashMap::new();
        for t in tasks.values() {
            if matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress) {
                if let Some(agent) = &t.assigned_agent {
                    *assigned_counts.entry(agent.clone()).or_insert(0) += 1;
                }
            }
        }

        let match_result = match_task(
            &task_snapshot,
            &|name| *assigned_counts.get(name).unwrap_or(&0),
            &|name| self.registry.contains(name),
            &|name| template_for_technology(name),
            self.manager.config().agents.allow_dynamic_creation,
        );

        if match_result.created_new {
            if let Some(descriptor) = template_for_technology(&match_result.agent_name) {
                let _ = self.registry.create(descriptor, true);
            }
        }

        self.events.publish(ScrumEvent::TaskClaimed {
            task_id: task_id.to_string(),
            agent_name: match_result.agent_name.clone(),
            confidence: match_result.confidence,
            at: Utc::now(),
        });

        if last_agent.as_deref() != Some(match_result.agent_name.as_str()) {
            if let Some(sprint_id) = sprint_id {
                let mut sprints = self.manager.load_sprints()?;
                if let Some(s) = sprints.get_mut(sprint_id) {
                    s.record_handoff(last_agent.clone(), &match_result.agent_name, "next ready task");
                }
                self.manager.save_sprints(&sprints)?;
            }
            self.events.publish(ScrumEvent::Handoff {
                from_agent: last_agent.clone(),
                to_agent: match_result.agent_name.clone(),
                reason: "next ready task".to_string(),
                at: Utc::now(),
            });
        }

        let kind = branch_kind_for(&task_snapshot);
        let (worktree_path, _branch) = self.worktrees.create(task_id, &match_result.agent_name, kind)?;

        if let Some(t) = tasks.get_mut(task_id) {
            t.status = TaskStatus::InProgress;
            t.assigned_agent = Some(match_result.agent_name.clone());
        }
        self.manager.save_tasks(tasks)?;

        let descriptor = self
            .registry
            .get(&match_result.agent_name)
            .cloned()
            .unwrap_or_else(AgentDescriptor::generic_engineer);

        let result = self.executor.execute(
            &tasks[task_id],
            &descriptor,
            &worktree_path,
            self.manager.config().scrum.test_coverage_required,
            &|| false,
        );

        match result.status {
            TaskOutcome::Completed => {
                let _ = self.worktrees.push(task_id);
                let pr_url = self
                    .worktrees
                    .open_pr(
                        task_id,
                        &pr_title(&task_snapshot),
                        &pr_body(&task_snapshot, &result),
                        &self.manager.config().pr.tool,
                        &self.manager.config().pr.base_branch,
                    )
                    .ok();
                let _ = pr_url;

                if let Some(t) = tasks.get_mut(task_id) {
                    t.status = TaskStatus::Completed;
                    t.completed_at = Some(Utc::now());
                }

                let story_done = tasks
                    .values()
                    .filter(|t| t.story_id == task_snapshot.story_id)
                    .all(|t| matches!(t.status, TaskStatus::Completed));
                if story_done {
                    if let Some(story) = stories.get_mut(&task_snapshot.story_id) {
                        story.status = StoryStatus::Done;
                        story.touch();
                    }
                }

                if let Some(sprint_id) = sprint_id {
                    let sprint = self.manager.get_sprint(sprint_id)?;
                    let story_ids: HashSet<&str> = sprint
                        .committed_items
                        .iter()
                        .filter(|item| item.kind == ItemKind::Story)
                        .map(|item| item.id.as_str())
                        .collect();
                    let remaining: f64 = stories
                        .values()
                        .filter(|s| story_ids.contains(s.id.as_str()) && !matches!(s.status, StoryStatus::Done))
                        .map(|s| s.story_points.unwrap_or(0) as f64)
                        .sum();
                    let mut sprints = self.manager.load_sprints()?;
                    if let Some(s) = sprints.get_mut(sprint_id) {
                        s.record_burndown(remaining);
                    }
                    self.manager.save_sprints(&sprints)?;
                }
            }
            TaskOutcome::Failed | TaskOutcome::Blocked => {
                if let Some(t) = tasks.get_mut(task_id) {
                    t.status = TaskStatus::Blocked;
                }
            }
        }

        self.manager.save_tasks(tasks)?;
        *last_agent = Some(match_result.agent_name.clone());
        Ok(result)
    }

    /// §6's `delegate(task_id)` façade operation: matches and executes
    /// exactly one task independent of a sprint run. `task_id` must be
    /// `Pending` with all dependencies `Completed`.
    pub fn delegate(&mut self, task_id: &str) -> ScrumResult<scrumforge_agents::TaskResult> {
        let mut tasks = self.manager.load_tasks()?;
        let mut stories = self.manager.load_stories()?;

        {
            let task = tasks
                .get(task_id)
                .ok_or_else(|| ScrumError::not_found("task", task_id))?;
            if !matches!(task.status, TaskStatus::Pending) {
                return Err(ScrumError::validation(format!("task {task_id} is not Pending")));
            }
            if !task.dependencies_satisfied(&|dep| matches!(tasks.get(dep).map(|t| t.status), Some(TaskStatus::Completed))) {
                return Err(ScrumError::dependency(format!("task {task_id} has unmet dependencies")));
            }
        }

        let mut last_agent = None;
        let result = self.delegate_one(task_id, &mut tasks, &mut stories, &mut last_agent, None)?;
        self.manager.save_stories(&stories)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topological_order_respects_dependencies() {
        use chrono::Utc;
        use scrumforge_data::Priority;

        let a = Task {
            id: "TASK-A".into(),
            story_id: "US-1".into(),
            title: "A".into(),
            description: String::new(),
            technical_details: String::new(),
            estimated_hours: 1.0,
            status: TaskStatus::Pending,
            assigned_agent: None,
            test_criteria: vec![],
            dependencies: vec![],
            priority: Priority::Medium,
            created_at: Utc::now(),
            completed_at: None,
        };
        let mut b = a.clone();
        b.id = "TASK-B".into();
        b.dependencies = vec!["TASK-A".into()];

        let order = topological_order(&[b.clone(), a.clone()]).unwrap();
        assert_eq!(order, vec!["TASK-A".to_string(), "TASK-B".to_string()]);
    }

    #[test]
    fn topological_order_detects_cycle() {
        use chrono::Utc;
        use scrumforge_data::Priority;

        let mut a = Task {
            id: "TASK-A".into(),
            story_id: "US-1".into(),
            title: "A".into(),
            description: String::new(),
            technical_details: String::new(),
            estimated_hours: 1.0,
            status: TaskStatus::Pending,
            assigned_agent: None,
            test_criteria: vec![],
            dependencies: vec!["TASK-B".into()],
            priority: Priority::Medium,
            created_at: Utc::now(),
            completed_at: None,
        };
        let mut b = a.clone();
        b.id = "TASK-B".into();
        b.dependencies = vec!["TASK-A".into()];
        a.dependencies = vec!["TASK-B".into()];

        let err = topological_order(&[a, b]).unwrap_err();
        assert_eq!(err.kind(), scrumforge_data::ErrorKind::Dependency);
    }
}
