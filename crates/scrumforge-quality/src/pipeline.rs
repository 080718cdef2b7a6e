//! Generic quality gate pipeline. `GateContext` carries the inputs the
//! executor's gates need: coverage reading, the task dependency graph, and
//! agent descriptor files.

use scrumforge_data::{ScrumResult, Task};
use std::fmt;
use std::path::PathBuf;

/// A single check run by the pipeline. Gates never mutate project state;
/// they only read and report.
pub trait QualityGate: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, context: &GateContext) -> ScrumResult<GateResult>;
    fn is_critical(&self) -> bool {
        true
    }
}

/// Inputs a gate may need. Not every gate reads every field.
#[derive(Debug, Clone, Default)]
pub struct GateContext {
    pub project_root: PathBuf,
    pub tasks: Vec<Task>,
    pub agent_descriptor_paths: Vec<PathBuf>,
    pub coverage_percent: Option<f64>,
    pub coverage_required: u32,
}

impl GateContext {
    pub fn new(project_root: PathBuf) -> Self {
        GateContext {
            project_root,
            tasks: Vec::new(),
            agent_descriptor_paths: Vec::new(),
            coverage_percent: None,
            coverage_required: 100,
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_agent_descriptor_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.agent_descriptor_paths = paths;
        self
    }

    pub fn with_coverage(mut self, percent: Option<f64>, required: u32) -> Self {
        self.coverage_percent = percent;
        self.coverage_required = required;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GateResult {
    pub passed: bool,
    pub gate_name: String,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl GateResult {
    pub fn pass(gate_name: String) -> Self {
        GateResult {
            passed: true,
            gate_name,
            messages: vec![],
            errors: vec![],
            warnings: vec![],
        }
    }

    pub fn fail(gate_name: String, errors: Vec<String>) -> Self {
        GateResult {
            passed: false,
            gate_name,
            messages: vec![],
            errors,
            warnings: vec![],
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_warning(mut self, warning: String) -> Self {
        self.warnings.push(warning);
        self
    }
}

impl fmt::Display for GateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            write!(f, "PASS {}", self.gate_name)?;
        } else {
            write!(f, "FAIL {}", self.gate_name)?;
        }
        if !self.messages.is_empty() {
            write!(f, "\n  {}", self.messages.join("\n  "))?;
        }
        if !self.errors.is_empty() {
            write!(f, "\n  errors:\n    {}", self.errors.join("\n    "))?;
        }
        if !self.warnings.is_empty() {
            write!(f, "\n  warnings:\n    {}", self.warnings.join("\n    "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct QualityReport {
    pub results: Vec<GateResult>,
    pub passed: bool,
}

impl QualityReport {
    pub fn new() -> Self {
        QualityReport {
            results: Vec::new(),
            passed: true,
        }
    }

    pub fn add_result(&mut self, result: GateResult) {
        if !result.passed {
            self.passed = false;
        }
        self.results.push(result);
    }

    pub fn total_gates(&self) -> usize {
        self.results.len()
    }

    pub fn passed_gates(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_gates(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quality Gate Report")?;
        writeln!(f, "====================")?;
        for result in &self.results {
            writeln!(f, "\n{result}")?;
        }
        writeln!(f, "\n====================")?;
        writeln!(f, "total: {}  passed: {}  failed: {}", self.total_gates(), self.passed_gates(), self.failed_gates())?;
        Ok(())
    }
}

/// Ordered sequence of gates. `stop_on_failure` halts on the first failed
/// critical gate, matching the "coverage gate blocks completion" contract
/// in §4.7 rather than collecting every downstream failure.
pub struct QualityPipeline {
    gates: Vec<Box<dyn QualityGate>>,
    stop_on_failure: bool,
}

impl QualityPipeline {
    pub fn new() -> Self {
        QualityPipeline {
            gates: Vec::new(),
            stop_on_failure: true,
        }
    }

    pub fn add_gate<G: QualityGate + 'static>(mut self, gate: G) -> Self {
        self.gates.push(Box::new(gate));
        self
    }

    pub fn stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    pub fn run(&self, context: &GateContext) -> ScrumResult<QualityReport> {
        let mut report = QualityReport::new();

        for gate in &self.gates {
            tracing::info!(gate = gate.name(), "running quality gate");

            match gate.run(context) {
                Ok(result) => {
                    let passed = result.passed;
                    let is_critical = gate.is_critical();
                    report.add_result(result);
                    if self.stop_on_failure && !passed && is_critical {
                        tracing::warn!(gate = gate.name(), "critical gate failed, stopping pipeline");
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(gate = gate.name(), error = %e, "gate execution error");
                    let critical = gate.is_critical();
                    report.add_result(GateResult::fail(
                        gate.name().to_string(),
                        vec![format!("gate execution error: {e}")],
                    ));
                    if self.stop_on_failure && critical {
                        break;
                    }
                }
            }
        }

        Ok(report)
    }
}

impl Default for QualityPipeline {
    fn default() -> Self {
        Self::new()
    }
}
