//! SCRUM Manager: backlog CRUD, auto-estimation, sprint planning and
//! lifecycle, velocity.
//!
//! Built on `scrumforge_data::EntityStore`, one store per entity kind,
//! read-modify-write on every mutation rather than holding mutable state
//! in memory between calls.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Duration as ChronoDuration, Utc};
use scrumforge_data::{
    generate_id, Bug, BugStatus, CommittedItem, Config, Epic, EntityKind, EntityStore, EventBus,
    ItemKind, Priority, Roadmap, ScrumError, ScrumEvent, ScrumResult, Severity, Sprint,
    SprintStatus, Story, StoryStatus, Task, TaskStatus, FIBONACCI_POINTS,
};

/// Weighted keyword scoring for the auto-estimation fallback used by
/// `estimate_story` when no explicit point value is given. Each hit adds its
/// weight to a running complexity score, which is then bucketed onto the
/// Fibonacci scale.
const TECHNICAL_TERMS: &[(&str, u32)] = &[
    ("authentication", 6),
    ("authorization", 6),
    ("auth", 5),
    ("security", 6),
    ("encryption", 6),
    ("database", 5),
    ("migration", 5),
    ("api", 4),
    ("integration", 5),
    ("websocket", 5),
    ("async", 4),
    ("cache", 4),
    ("queue", 4),
    ("notification", 3),
    ("ui", 2),
    ("interface", 2),
];

const CRUD_TERMS: &[&str] = &["create", "read", "update", "delete", "list", "search"];

const NONFUNCTIONAL_TERMS: &[(&str, u32)] = &[
    ("performance", 5),
    ("scalability", 5),
    ("scale", 4),
    ("compliance", 5),
    ("latency", 4),
    ("throughput", 4),
];

fn complexity_score(story: &Story) -> u32 {
    let text = story.narrative().to_lowercase();
    let mut score = 0u32;

    for (term, weight) in TECHNICAL_TERMS {
        if text.contains(term) {
            score += weight;
        }
    }
    let crud_hits = CRUD_TERMS.iter().filter(|t| text.contains(**t)).count() as u32;
    score += crud_hits * 2;
    for (term, weight) in NONFUNCTIONAL_TERMS {
        if text.contains(term) {
            score += weight;
        }
    }

    let ac_count = story.acceptance_criteria.len() as u32;
    score += ac_count;
    if ac_count >= 6 {
        score += 5;
    }

    score
}

fn points_from_score(score: u32) -> u8 {
    match score {
        s if s < 5 => 1,
        s if s < 10 => 2,
        s if s < 15 => 3,
        s if s < 25 => 5,
        s if s < 40 => 8,
        s if s < 60 => 13,
        _ => 21,
    }
}

pub(crate) fn priority_rank(p: Priority) -> u8 {
    match p {
        Priority::Critical => 0,
        Priority::High => 1,
        Priority::Medium => 2,
        Priority::Low => 3,
    }
}

/// Backlog CRUD, estimation, and sprint lifecycle operations, backed by one
/// `EntityStore` per entity kind under `<state_root>/data/`.
pub struct ScrumManager {
    stories: EntityStore<Story>,
    tasks: EntityStore<Task>,
    bugs: EntityStore<Bug>,
    sprints: EntityStore<Sprint>,
    epics: EntityStore<Epic>,
    roadmaps: EntityStore<Roadmap>,
    config: Config,
    events: EventBus,
}

impl ScrumManager {
    pub fn new(state_root: impl Into<PathBuf>, config: Config, events: EventBus) -> Self {
        let data_dir = state_root.into().join("data");
        ScrumManager {
            stories: EntityStore::new(data_dir.join("stories.json")),
            tasks: EntityStore::new(data_dir.join("tasks.json")),
            bugs: EntityStore::new(data_dir.join("bugs.json")),
            sprints: EntityStore::new(data_dir.join("sprints.json")),
            epics: EntityStore::new(data_dir.join("epics.json")),
            roadmaps: EntityStore::new(data_dir.join("roadmaps.json")),
            config,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // -- Story ---------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn create_story(
        &self,
        title: impl Into<String>,
        role: impl Into<String>,
        want: impl Into<String>,
        benefit: impl Into<String>,
        acceptance_criteria: Vec<String>,
        priority: Priority,
        epic_id: Option<String>,
    ) -> ScrumResult<Story> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ScrumError::validation("story title must not be empty"));
        }

        let mut stories = self.stories.load()?;
        let id = generate_id(EntityKind::Story, &|candidate| stories.contains_key(candidate));
        let now = Utc::now();
        let story = Story {
            id: id.clone(),
            title,
            role: role.into(),
            want: want.into(),
            benefit: benefit.into(),
            acceptance_criteria,
            priority,
            status: StoryStatus::Backlog,
            story_points: None,
            epic_id,
            created_at: now,
            updated_at: now,
        };
        stories.insert(id, story.clone());
        self.stories.save(&stories)?;
        Ok(story)
    }

    pub fn get_story(&self, story_id: &str) -> ScrumResult<Story> {
        self.stories
            .load()?
            .get(story_id)
            .cloned()
            .ok_or_else(|| ScrumError::not_found("story", story_id))
    }

    pub fn list_stories(&self) -> ScrumResult<Vec<Story>> {
        Ok(self.stories.load()?.into_values().collect())
    }

    /// Sets `story_points` explicitly, or auto-estimates from the narrative
    /// and acceptance criteria when `points` is `None`.
    pub fn estimate_story(&self, story_id: &str, points: Option<u8>) -> ScrumResult<Story> {
        let mut stories = self.stories.load()?;
        let story = stories
            .get_mut(story_id)
            .ok_or_else(|| ScrumError::not_found("story", story_id))?;

        let assigned = match points {
            Some(p) => {
                if !FIBONACCI_POINTS.contains(&p) {
                    return Err(ScrumError::validation_with_hint(
                        format!("{p} is not a valid story point value"),
                        "use one of 1, 2, 3, 5, 8, 13, 21",
                    ));
                }
                p
            }
            None => points_from_score(complexity_score(story)),
        };

        story.story_points = Some(assigned);
        story.touch();
        let result = story.clone();
        self.stories.save(&stories)?;
        Ok(result)
    }

    // -- Task ------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn create_task(
        &self,
        story_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        technical_details: impl Into<String>,
        estimated_hours: Option<f64>,
        test_criteria: Vec<String>,
        dependencies: Vec<String>,
        priority: Priority,
    ) -> ScrumResult<Task> {
        let story_id = story_id.into();
        let stories = self.stories.load()?;
        if !stories.contains_key(&story_id) {
            return Err(ScrumError::not_found("story", story_id));
        }

        let mut tasks = self.tasks.load()?;
        for dep in &dependencies {
            if !tasks.contains_key(dep) {
                return Err(ScrumError::not_found("task", dep.clone()));
            }
        }

        let id = generate_id(EntityKind::Task, &|candidate| tasks.contains_key(candidate));
        let task = Task {
            id: id.clone(),
            story_id,
            title: title.into(),
            description: description.into(),
            technical_details: technical_details.into(),
            estimated_hours: estimated_hours.unwrap_or(4.0),
            status: TaskStatus::Pending,
            assigned_agent: None,
            test_criteria,
            dependencies,
            priority,
            created_at: Utc::now(),
            completed_at: None,
        };
        tasks.insert(id, task.clone());
        self.tasks.save(&tasks)?;
        Ok(task)
    }

    pub fn get_task(&self, task_id: &str) -> ScrumResult<Task> {
        self.tasks
            .load()?
            .get(task_id)
            .cloned()
            .ok_or_else(|| ScrumError::not_found("task", task_id))
    }

    pub fn list_tasks(&self) -> ScrumResult<Vec<Task>> {
        Ok(self.tasks.load()?.into_values().collect())
    }

    pub fn assign_agent(&self, task_id: &str, agent_name: impl Into<String>) -> ScrumResult<Task> {
        let mut tasks = self.tasks.load()?;
        let task = tasks
            .get_mut(task_id)
            .ok_or_else(|| ScrumError::not_found("task", task_id))?;
        task.assigned_agent = Some(agent_name.into());
        let result = task.clone();
        self.tasks.save(&tasks)?;
        Ok(result)
    }

    // -- Bug ---------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn create_bug(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        steps_to_reproduce: Vec<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        severity: Severity,
        priority: Priority,
        story_points: Option<u8>,
    ) -> ScrumResult<Bug> {
        let mut bugs = self.bugs.load()?;
        let id = generate_id(EntityKind::Bug, &|candidate| bugs.contains_key(candidate));
        let now = Utc::now();
        let bug = Bug {
            id: id.clone(),
            title: title.into(),
            description: description.into(),
            steps_to_reproduce,
            expected: expected.into(),
            actual: actual.into(),
            severity,
            priority,
            status: BugStatus::Open,
            story_points: story_points.or_else(|| Some(severity.default_story_points())),
            created_at: now,
            updated_at: now,
        };
        bugs.insert(id, bug.clone());
        self.bugs.save(&bugs)?;
        Ok(bug)
    }

    pub fn get_bug(&self, bug_id: &str) -> ScrumResult<Bug> {
        self.bugs
            .load()?
            .get(bug_id)
            .cloned()
            .ok_or_else(|| ScrumError::not_found("bug", bug_id))
    }

    pub fn list_bugs(&self) -> ScrumResult<Vec<Bug>> {
        Ok(self.bugs.load()?.into_values().collect())
    }

    // -- Epic ------------------------------------------------------------

    pub fn create_epic(
        &self,
        title: impl Into<String>,
        theme: impl Into<String>,
        business_value: impl Into<String>,
    ) -> ScrumResult<Epic> {
        let mut epics = self.epics.load()?;
        let id = generate_id(EntityKind::Epic, &|candidate| epics.contains_key(candidate));
        let epic = Epic {
            id: id.clone(),
            title: title.into(),
            theme: theme.into(),
            business_value: business_value.into(),
            story_ids: Vec::new(),
            created_at: Utc::now(),
        };
        epics.insert(id, epic.clone());
        self.epics.save(&epics)?;
        Ok(epic)
    }

    pub fn get_epic(&self, epic_id: &str) -> ScrumResult<Epic> {
        self.epics
            .load()?
            .get(epic_id)
            .cloned()
            .ok_or_else(|| ScrumError::not_found("epic", epic_id))
    }

    pub fn list_epics(&self) -> ScrumResult<Vec<Epic>> {
        Ok(self.epics.load()?.into_values().collect())
    }

    /// Adds a story to an epic's aggregate and stamps the story's `epic_id`,
    /// failing with `NotFoundError` if either side is unknown.
    pub fn add_story_to_epic(&self, epic_id: &str, story_id: &str) -> ScrumResult<Epic> {
        let mut stories = self.stories.load()?;
        let story = stories
            .get_mut(story_id)
            .ok_or_else(|| ScrumError::not_found("story", story_id))?;

        let mut epics = self.epics.load()?;
        let epic = epics
            .get_mut(epic_id)
            .ok_or_else(|| ScrumError::not_found("epic", epic_id))?;
        if !epic.story_ids.iter().any(|s| s == story_id) {
            epic.story_ids.push(story_id.to_string());
        }
        story.epic_id = Some(epic_id.to_string());
        story.updated_at = Utc::now();
        let epic = epic.clone();

        self.epics.save(&epics)?;
        self.stories.save(&stories)?;
        Ok(epic)
    }

    // -- Roadmap -----------------------------------------------------------

    /// Auto-seeds a roadmap with four milestones spanning 16 weeks, as
    /// invoked by the create-project operation (§3 Roadmap).
    pub fn seed_roadmap(&self, project_name: &str) -> ScrumResult<Roadmap> {
        let mut roadmaps = self.roadmaps.load()?;
        let id = generate_id(EntityKind::Roadmap, &|candidate| roadmaps.contains_key(candidate));
        let roadmap = Roadmap::seed_default(id.clone(), project_name);
        roadmaps.insert(id, roadmap.clone());
        self.roadmaps.save(&roadmaps)?;
        Ok(roadmap)
    }

    pub fn get_roadmap(&self, roadmap_id: &str) -> ScrumResult<Roadmap> {
        self.roadmaps
            .load()?
            .get(roadmap_id)
            .cloned()
            .ok_or_else(|| ScrumError::not_found("roadmap", roadmap_id))
    }

    pub fn list_roadmaps(&self) -> ScrumResult<Vec<Roadmap>> {
        Ok(self.roadmaps.load()?.into_values().collect())
    }

    // -- Sprint --------------------------------------------------------

    pub fn get_sprint(&self, sprint_id: &str) -> ScrumResult<Sprint> {
        self.sprints
            .load()?
            .get(sprint_id)
            .cloned()
            .ok_or_else(|| ScrumError::not_found("sprint", sprint_id))
    }

    pub fn list_sprints(&self) -> ScrumResult<Vec<Sprint>> {
        Ok(self.sprints.load()?.into_values().collect())
    }

    pub(crate) fn load_sprints(&self) -> ScrumResult<BTreeMap<String, Sprint>> {
        self.sprints.load()
    }

    pub(crate) fn save_sprints(&self, sprints: &BTreeMap<String, Sprint>) -> ScrumResult<()> {
        self.sprints.save(sprints)
    }

    pub(crate) fn load_tasks(&self) -> ScrumResult<BTreeMap<String, Task>> {
        self.tasks.load()
    }

    pub(crate) fn save_tasks(&self, tasks: &BTreeMap<String, Task>) -> ScrumResult<()> {
        self.tasks.save(tasks)
    }

    pub(crate) fn load_stories(&self) -> ScrumResult<BTreeMap<String, Story>> {
        self.stories.load()
    }

    pub(crate) fn save_stories(&self, stories: &BTreeMap<String, Story>) -> ScrumResult<()> {
        self.stories.save(stories)
    }

    /// Greedily reserves backlog items into a new `Planned` sprint, highest
    /// priority first, stopping once adding an item would exceed
    /// `scrum.velocity_target`. Reserved stories move to `Ready`; bugs are
    /// committed but left `Open` until a task is created against their
    /// remediation (see `DESIGN.md` for why bugs are not executed directly).
    pub fn plan_sprint(
        &self,
        name: impl Into<String>,
        goal: impl Into<String>,
        duration_days: Option<u32>,
    ) -> ScrumResult<Sprint> {
        let mut stories = self.stories.load()?;
        let bugs = self.bugs.load()?;
        let mut sprints = self.sprints.load()?;

        let velocity_target = self.config.scrum.velocity_target;

        let mut candidates: Vec<(ItemKind, String, u8, Priority)> = Vec::new();
        for story in stories.values() {
            if story.is_plannable() {
                candidates.push((ItemKind::Story, story.id.clone(), story.story_points.unwrap_or(0), story.priority));
            }
        }
        for bug in bugs.values() {
            if matches!(bug.status, BugStatus::Open) {
                candidates.push((ItemKind::Bug, bug.id.clone(), bug.effective_points(), bug.priority));
            }
        }
        candidates.sort_by_key(|(_, id, _, priority)| (priority_rank(*priority), id.clone()));

        let mut committed = Vec::new();
        let mut total_points: u32 = 0;
        for (kind, id, points, _) in candidates {
            if total_points + points as u32 > velocity_target {
                continue;
            }
            committed.push(CommittedItem { kind, id: id.clone() });
            total_points += points as u32;
            if kind == ItemKind::Story {
                if let Some(story) = stories.get_mut(&id) {
                    story.status = StoryStatus::Ready;
                    story.touch();
                }
            }
        }

        let id = generate_id(EntityKind::Sprint, &|candidate| sprints.contains_key(candidate));
        let sprint = Sprint {
            id: id.clone(),
            name: name.into(),
            goal: goal.into(),
            duration_days: duration_days.unwrap_or(self.config.scrum.default_sprint_duration_days),
            status: SprintStatus::Planned,
            start_date: None,
            end_date: None,
            committed_items: committed,
            velocity_target,
            burndown: vec![],
            retrospective_notes: None,
            handoffs: vec![],
        };
        sprints.insert(id, sprint.clone());
        self.sprints.save(&sprints)?;
        self.stories.save(&stories)?;
        Ok(sprint)
    }

    /// Transitions a `Planned` sprint to `Active`. Refuses to start a second
    /// sprint while one is already `Active` (§5's "at most one Active
    /// sprint" invariant).
    pub fn start_sprint(&self, sprint_id: &str) -> ScrumResult<Sprint> {
        let mut sprints = self.sprints.load()?;
        if sprints.values().any(|s| s.is_active()) {
            return Err(ScrumError::conflict("another sprint is already Active"));
        }

        let now = Utc::now();
        let sprint = sprints
            .get_mut(sprint_id)
            .ok_or_else(|| ScrumError::not_found("sprint", sprint_id))?;
        sprint.status = SprintStatus::Active;
        sprint.start_date = Some(now);
        sprint.end_date = Some(now + ChronoDuration::days(sprint.duration_days as i64));
        let result = sprint.clone();
        self.sprints.save(&sprints)?;

        self.events.publish(ScrumEvent::SprintStarted {
            sprint_id: result.id.clone(),
            task_count: result.committed_items.len(),
            at: now,
        });
        Ok(result)
    }

    /// Completes a sprint: unfinished committed items return to the backlog
    /// (`Backlog` for stories, `Open` for bugs) with their estimates intact,
    /// a final burndown point is recorded, and the retrospective is stored.
    pub fn complete_sprint(&self, sprint_id: &str, retrospective: Option<String>) -> ScrumResult<Sprint> {
        let mut sprints = self.sprints.load()?;
        let mut stories = self.stories.load()?;
        let mut bugs = self.bugs.load()?;

        let sprint = sprints
            .get_mut(sprint_id)
            .ok_or_else(|| ScrumError::not_found("sprint", sprint_id))?;

        let mut remaining_points = 0.0;
        for item in &sprint.committed_items {
            match item.kind {
                ItemKind::Story => {
                    if let Some(story) = stories.get_mut(&item.id) {
                        if !matches!(story.status, StoryStatus::Done) {
                            story.status = StoryStatus::Backlog;
                            story.touch();
                            remaining_points += story.story_points.unwrap_or(0) as f64;
                        }
                    }
                }
                ItemKind::Bug => {
                    if let Some(bug) = bugs.get_mut(&item.id) {
                        if !matches!(bug.status, BugStatus::Resolved | BugStatus::Closed) {
                            bug.status = BugStatus::Open;
                            bug.updated_at = Utc::now();
                            remaining_points += bug.effective_points() as f64;
                        }
                    }
                }
            }
        }

        sprint.record_burndown(remaining_points);
        sprint.status = SprintStatus::Completed;
        sprint.retrospective_notes = retrospective;
        let result = sprint.clone();
        let completed_count = result
            .committed_items
            .iter()
            .filter(|item| match item.kind {
                ItemKind::Story => stories.get(&item.id).map(|s| matches!(s.status, StoryStatus::Done)).unwrap_or(false),
                ItemKind::Bug => bugs.get(&item.id).map(|b| matches!(b.status, BugStatus::Resolved | BugStatus::Closed)).unwrap_or(false),
            })
            .count();

        self.sprints.save(&sprints)?;
        self.stories.save(&stories)?;
        self.bugs.save(&bugs)?;

        self.events.publish(ScrumEvent::SprintCompleted {
            sprint_id: result.id.clone(),
            completed_count,
            at: Utc::now(),
        });
        Ok(result)
    }

    /// Mean committed-and-completed points across the last `n` `Completed`
    /// sprints (most recent first, by `end_date`). Returns `0.0` with no
    /// completed-sprint history.
    pub fn velocity(&self, n: usize) -> ScrumResult<f64> {
        let sprints = self.sprints.load()?;
        let stories = self.stories.load()?;
        let bugs = self.bugs.load()?;

        let mut completed: Vec<&Sprint> = sprints
            .values()
            .filter(|s| matches!(s.status, SprintStatus::Completed))
            .collect();
        completed.sort_by(|a, b| b.end_date.cmp(&a.end_date));
        completed.truncate(n.max(1));

        if completed.is_empty() {
            return Ok(0.0);
        }

        let mut total = 0.0;
        for sprint in &completed {
            for item in &sprint.committed_items {
                match item.kind {
                    ItemKind::Story => {
                        if let Some(story) = stories.get(&item.id) {
                            if matches!(story.status, StoryStatus::Done) {
                                total += story.story_points.unwrap_or(0) as f64;
                            }
                        }
                    }
                    ItemKind::Bug => {
                        if let Some(bug) = bugs.get(&item.id) {
                            if matches!(bug.status, BugStatus::Resolved | BugStatus::Closed) {
                                total += bug.effective_points() as f64;
                            }
                        }
                    }
                }
            }
        }
        Ok(total / completed.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager(dir: &std::path::Path) -> ScrumManager {
        ScrumManager::new(dir, Config::for_new_project("demo"), EventBus::new())
    }

    #[test]
    fn empty_story_estimates_to_one_point() {
        let dir = tempdir().unwrap();
        let mgr = manager(dir.path());
        let story = mgr.create_story("Untitled", "user", "do nothing", "", vec![], Priority::Medium, None).unwrap();
        let estimated = mgr.estimate_story(&story.id, None).unwrap();
        assert_eq!(estimated.story_points, Some(1));
    }

    #[test]
    fn explicit_non_fibonacci_points_rejected() {
        let dir = tempdir().unwrap();
        let mgr = manager(dir.path());
        let story = mgr.create_story("X", "user", "y", "z", vec![], Priority::Medium, None).unwrap();
        let err = mgr.estimate_story(&story.id, Some(4)).unwrap_err();
        assert_eq!(err.kind(), scrumforge_data::ErrorKind::Validation);
    }

    #[test]
    fn zero_velocity_target_yields_empty_sprint() {
        let dir = tempdir().unwrap();
        let mut config = Config::for_new_project("demo");
        config.scrum.velocity_target = 0;
        let mgr = ScrumManager::new(dir.path(), config, EventBus::new());
        let story = mgr.create_story("Login", "user", "sign in", "access my data", vec![], Priority::High, None).unwrap();
        mgr.estimate_story(&story.id, Some(3)).unwrap();

        let sprint = mgr.plan_sprint("Sprint 1", "ship login", None).unwrap();
        assert!(sprint.committed_items.is_empty());
    }

    #[test]
    fn second_active_sprint_is_rejected() {
        let dir = tempdir().unwrap();
        let mgr = manager(dir.path());
        let a = mgr.plan_sprint("A", "goal a", None).unwrap();
        let b = mgr.plan_sprint("B", "goal b", None).unwrap();
        mgr.start_sprint(&a.id).unwrap();
        let err = mgr.start_sprint(&b.id).unwrap_err();
        assert_eq!(err.kind(), scrumforge_data::ErrorKind::Conflict);
    }

    #[test]
    fn plan_sprint_prioritizes_critical_items_first() {
        let dir = tempdir().unwrap();
        let mut config = Config::for_new_project("demo");
        config.scrum.velocity_target = 3;
        let mgr = ScrumManager::new(dir.path(), config, EventBus::new());

        let low = mgr.create_story("Low", "user", "a", "b", vec![], Priority::Low, None).unwrap();
        mgr.estimate_story(&low.id, Some(3)).unwrap();
        let critical = mgr.create_story("Critical", "user", "c", "d", vec![], Priority::Critical, None).unwrap();
        mgr.estimate_story(&critical.id, Some(3)).unwrap();

        let sprint = mgr.plan_sprint("Sprint 1", "goal", None).unwrap();
        assert_eq!(sprint.committed_items.len(), 1);
        assert_eq!(sprint.committed_items[0].id, critical.id);
    }

    #[test]
    fn adding_story_to_epic_stamps_both_sides() {
        let dir = tempdir().unwrap();
        let mgr = manager(dir.path());
        let epic = mgr.create_epic("Checkout revamp", "commerce", "reduce cart abandonment").unwrap();
        let story = mgr.create_story("Login", "user", "sign in", "access my data", vec![], Priority::High, None).unwrap();

        let epic = mgr.add_story_to_epic(&epic.id, &story.id).unwrap();
        assert_eq!(epic.story_ids, vec![story.id.clone()]);

        let story = mgr.get_story(&story.id).unwrap();
        assert_eq!(story.epic_id, Some(epic.id));
    }

    #[test]
    fn unknown_epic_or_story_is_not_found() {
        let dir = tempdir().unwrap();
        let mgr = manager(dir.path());
        let story = mgr.create_story("X", "user", "y", "z", vec![], Priority::Medium, None).unwrap();
        let err = mgr.add_story_to_epic("EPIC-MISSING", &story.id).unwrap_err();
        assert_eq!(err.kind(), scrumforge_data::ErrorKind::NotFound);
    }

    #[test]
    fn complete_sprint_counts_only_items_actually_done() {
        use std::sync::{Arc, Mutex};

        let dir = tempdir().unwrap();
        let mut config = Config::for_new_project("demo");
        config.scrum.velocity_target = 20;

        let counts: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_counts = counts.clone();
        let events = EventBus::with_sink(Box::new(move |event| {
            if let scrumforge_data::ScrumEvent::SprintCompleted { completed_count, .. } = event {
                sink_counts.lock().unwrap().push(*completed_count);
            }
        }));
        let mgr = ScrumManager::new(dir.path(), config, events);

        let a = mgr.create_story("A", "user", "a", "b", vec![], Priority::High, None).unwrap();
        mgr.estimate_story(&a.id, Some(3)).unwrap();
        let b = mgr.create_story("B", "user", "a", "b", vec![], Priority::High, None).unwrap();
        mgr.estimate_story(&b.id, Some(3)).unwrap();
        let c = mgr.create_story("C", "user", "a", "b", vec![], Priority::High, None).unwrap();
        mgr.estimate_story(&c.id, Some(3)).unwrap();

        let sprint = mgr.plan_sprint("Sprint 1", "goal", None).unwrap();
        assert_eq!(sprint.committed_items.len(), 3);

        mgr.complete_sprint(&sprint.id, None).unwrap();

        // None of the three stories reached Done, so nothing should be
        // reported as completed -- not `committed_items.len() - 1`.
        assert_eq!(counts.lock().unwrap().as_slice(), &[0]);
    }

    #[test]
    fn seed_roadmap_persists_four_milestones() {
        let dir = tempdir().unwrap();
        let mgr = manager(dir.path());
        let roadmap = mgr.seed_roadmap("Demo").unwrap();
        assert_eq!(roadmap.milestones.len(), 4);
        let reloaded = mgr.get_roadmap(&roadmap.id).unwrap();
        assert_eq!(reloaded.milestones.len(), 4);
    }
}
