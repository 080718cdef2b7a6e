use serde::{Deserialize, Serialize};

/// Inert configuration record describing an agent (§3 Agent descriptor,
/// §4.4 Agent Registry). Carries no executable logic: behavior is uniform
/// across agents and selected by these fields at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Kebab-case, e.g. "python", "test-runner". Also the registry key.
    pub name: String,
    pub display_name: String,

    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub short_label: String,

    pub language: String,

    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub file_patterns: Vec<String>,
    #[serde(default)]
    pub skill_keywords: Vec<String>,
    #[serde(default)]
    pub allowed_tools: Vec<String>,

    /// Shell commands used by the executor's test-first sequence (§4.7).
    #[serde(default)]
    pub test_command: Option<String>,
    #[serde(default)]
    pub coverage_command: Option<String>,
    #[serde(default)]
    pub lint_command: Option<String>,
}

impl AgentDescriptor {
    pub fn generic_engineer() -> Self {
        AgentDescriptor {
            name: "engineer".to_string(),
            display_name: "Generic Engineer".to_string(),
            color: "white".to_string(),
            emoji: "\u{1F527}".to_string(),
            short_label: "eng".to_string(),
            language: "generic".to_string(),
            frameworks: vec![],
            file_patterns: vec![],
            skill_keywords: vec![],
            allowed_tools: vec![],
            test_command: None,
            coverage_command: None,
            lint_command: None,
        }
    }
}
