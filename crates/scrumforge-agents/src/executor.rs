//! Agent Executor: runs the test-first sequence for one (task, agent)
//! pair inside its worktree, emitting phase events and producing a
//! `TaskResult`.
//!
//! Spawns real external tools (test runner, coverage tool, linter selected
//! from the agent descriptor), capturing stdout/stderr and inspecting exit
//! status, using blocking `std::process::Command` rather than
//! `tokio::process` — there is no concurrent work inside a single task
//! execution to justify an async runtime here.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use chrono::Utc;
use scrumforge_data::{AgentDescriptor, EventBus, ScrumEvent, Task};

use crate::invocation_log::{InvocationLog, InvocationRecord};

const TEST_TIMEOUT: Duration = Duration::from_secs(600);
const COVERAGE_TIMEOUT: Duration = Duration::from_secs(300);
const LINT_TIMEOUT: Duration = Duration::from_secs(120);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed,
    Blocked,
}

#[derive(Debug, Clone)]
pub struct TaskResult {
    pub status: TaskOutcome,
    pub summary: String,
    pub coverage_percent: Option<f64>,
    pub artifacts: Vec<String>,
    pub created_pr_url: Option<String>,
}

/// Outcome of a single timed subprocess invocation.
struct Invocation {
    success: bool,
    timed_out: bool,
    stdout: String,
    stderr: String,
}

fn run_timed(tool: &str, command: &str, cwd: &Path, timeout: Duration) -> std::io::Result<Invocation> {
    let mut child: Child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            let output = child.wait_with_output()?;
            return Ok(Invocation {
                success: status.success(),
                timed_out: false,
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Invocation {
                success: false,
                timed_out: true,
                stdout: String::new(),
                stderr: format!("{tool} timed out after {}s", timeout.as_secs()),
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Runs one invocation, retrying exactly once on timeout.
fn run_with_retry(tool: &str, command: &str, cwd: &Path, timeout: Duration) -> std::io::Result<Invocation> {
    let first = run_timed(tool, command, cwd, timeout)?;
    if first.timed_out {
        return run_timed(tool, command, cwd, timeout);
    }
    Ok(first)
}

pub struct AgentExecutor<'a> {
    events: &'a EventBus,
    log: &'a InvocationLog,
}

impl<'a> AgentExecutor<'a> {
    pub fn new(events: &'a EventBus, log: &'a InvocationLog) -> Self {
        AgentExecutor { events, log }
    }

    /// Executes the test-first sequence for `task` in `worktree_path` using
    /// `descriptor`'s shell commands. `cancelled` is polled at each phase
    /// boundary so a sprint halt takes effect between phases, not mid-command.
    pub fn execute(
        &self,
        task: &Task,
        descriptor: &AgentDescriptor,
        worktree_path: &Path,
        coverage_required: u32,
        cancelled: &dyn Fn() -> bool,
    ) -> TaskResult {
        self.events.publish(ScrumEvent::AgentTakeover {
            task_id: task.id.clone(),
            agent_name: descriptor.name.clone(),
            at: Utc::now(),
        });

        if cancelled() {
            return self.blocked(task, "cancelled before start");
        }

        self.phase(task, "Working");
        let Some(test_command) = descriptor.test_command.as_deref() else {
            return self.blocked(task, "agent has no test_command configured");
        };

        // (b) run the test tool, expecting non-zero exit before implementation exists.
        let pre_result = match run_with_retry("test", test_command, worktree_path, TEST_TIMEOUT) {
            Ok(r) => r,
            Err(e) => return self.failed(task, &format!("failed to invoke test tool: {e}")),
        };
        self.log.record(InvocationRecord::new(&task.id, "test", test_command, pre_result.success, &pre_result.stdout));

        if cancelled() {
            return self.blocked(task, "cancelled after pre-implementation test run");
        }

        self.phase(task, "Testing");
        // (d) re-run tests expecting zero exit, after implementation.
        let post_result = match run_with_retry("test", test_command, worktree_path, TEST_TIMEOUT) {
            Ok(r) => r,
            Err(e) => return self.failed(task, &format!("failed to invoke test tool: {e}")),
        };
        self.log.record(InvocationRecord::new(&task.id, "test", test_command, post_result.success, &post_result.stdout));

        if post_result.timed_out {
            return self.blocked(task, "timeout");
        }
        if !post_result.success {
            return self.failed(task, &format!("tests failed: {}", post_result.stderr));
        }

        if cancelled() {
            return self.blocked(task, "cancelled before coverage");
        }

        self.phase(task, "Coverage");
        let coverage_percent = match descriptor.coverage_command.as_deref() {
            Some(cmd) => {
                let result = match run_with_retry("coverage", cmd, worktree_path, COVERAGE_TIMEOUT) {
                    Ok(r) => r,
                    Err(e) => return self.failed(task, &format!("failed to invoke coverage tool: {e}")),
                };
                self.log.record(InvocationRecord::new(&task.id, "coverage", cmd, result.success, &result.stdout));
                if result.timed_out {
                    return self.blocked(task, "timeout");
                }
                parse_coverage_percent(&result.stdout)
            }
            None => None,
        };

        if let Some(lint_command) = descriptor.lint_command.as_deref() {
            if let Ok(result) = run_timed("lint", lint_command, worktree_path, LINT_TIMEOUT) {
                self.log.record(InvocationRecord::new(&task.id, "lint", lint_command, result.success, &result.stdout));
            }
        }

        let gate_passed = coverage_percent.map(|c| c >= coverage_required as f64).unwrap_or(false);
        if !gate_passed {
            return self.blocked(task, "coverage");
        }

        self.phase(task, "Completed");
        self.events.publish(ScrumEvent::TaskCompleted {
            task_id: task.id.clone(),
            coverage_percent,
            pr_url: None,
            at: Utc::now(),
        });

        TaskResult {
            status: TaskOutcome::Completed,
            summary: format!("{} completed by {}", task.id, descriptor.name),
            coverage_percent,
            artifacts: vec![],
            created_pr_url: None,
        }
    }

    fn phase(&self, task: &Task, phase: &str) {
        self.events.publish(ScrumEvent::PhaseChanged {
            task_id: task.id.clone(),
            phase: phase.to_string(),
            at: Utc::now(),
        });
    }

    fn failed(&self, task: &Task, reason: &str) -> TaskResult {
        self.events.publish(ScrumEvent::TaskFailed {
            task_id: task.id.clone(),
            reason: reason.to_string(),
            at: Utc::now(),
        });
        TaskResult {
            status: TaskOutcome::Failed,
            summary: reason.to_string(),
            coverage_percent: None,
            artifacts: vec![],
            created_pr_url: None,
        }
    }

    fn blocked(&self, task: &Task, reason: &str) -> TaskResult {
        self.events.publish(ScrumEvent::TaskFailed {
            task_id: task.id.clone(),
            reason: reason.to_string(),
            at: Utc::now(),
        });
        TaskResult {
            status: TaskOutcome::Blocked,
            summary: reason.to_string(),
            coverage_percent: None,
            artifacts: vec![],
            created_pr_url: None,
        }
    }
}

/// Reads a `NN.N%`-shaped coverage figure out of a tool's stdout. Coverage
/// tools format this differently; this looks for the last percentage-like
/// token, matching the common `TOTAL ... 92%` summary-line convention.
fn parse_coverage_percent(output: &str) -> Option<f64> {
    output
        .lines()
        .rev()
        .find_map(|line| {
            line.split_whitespace().rev().find_map(|token| {
                token.strip_suffix('%').and_then(|n| n.parse::<f64>().ok())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_percentage() {
        assert_eq!(parse_coverage_percent("Name  Stmts  Miss  Cover\nTOTAL  100  8  92%"), Some(92.0));
    }

    #[test]
    fn missing_percentage_returns_none() {
        assert_eq!(parse_coverage_percent("no coverage data"), None);
    }
}
