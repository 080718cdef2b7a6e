//! Agent Registry: loads `AgentDescriptor`s from a well-known YAML
//! directory at startup, refuses duplicate names, and persists new
//! descriptors created on demand by the matcher.
//!
//! Descriptors are meant to be individually author-edited and optionally
//! accompanied by a markdown sidecar read by downstream tooling, so this
//! follows a directory-of-YAML-files layout rather than one JSON map file;
//! the load/refuse-duplicate/persist shape otherwise matches
//! `scrumforge_data::persistence::EntityStore`.

use scrumforge_data::{AgentDescriptor, ScrumError, ScrumResult};
use scrumforge_quality::SchemaValidator;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Validates a descriptor against the embedded schema (§4.4), surfacing
/// failures as a `SchemaError` rather than letting a malformed descriptor
/// load or persist silently.
fn validate_descriptor(descriptor: &AgentDescriptor, source: &str) -> ScrumResult<()> {
    let value = serde_json::to_value(descriptor)
        .map_err(|e| ScrumError::schema(source, format!("failed to serialize descriptor: {e}")))?;
    let validation = SchemaValidator::agent_descriptor_schema()?.validate_value(&value)?;
    if validation.is_valid() {
        return Ok(());
    }
    let messages: Vec<String> = validation
        .errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect();
    Err(ScrumError::schema(source, messages.join("; ")))
}

pub struct AgentRegistry {
    dir: PathBuf,
    descriptors: BTreeMap<String, AgentDescriptor>,
}

impl AgentRegistry {
    /// Loads every `*.yaml`/`*.yml` descriptor in `dir`. Missing directory
    /// is not an error: it is created and seeded with the built-ins.
    pub fn load(dir: impl Into<PathBuf>) -> ScrumResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut descriptors = BTreeMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yaml" || e == "yml")
                .unwrap_or(false);
            if !is_yaml {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            let descriptor: AgentDescriptor = serde_yaml::from_str(&content)?;
            validate_descriptor(&descriptor, &path.display().to_string())?;
            if descriptors.contains_key(&descriptor.name) {
                return Err(ScrumError::conflict(format!(
                    "duplicate agent descriptor name '{}' in {}",
                    descriptor.name,
                    path.display()
                )));
            }
            descriptors.insert(descriptor.name.clone(), descriptor);
        }

        let mut registry = AgentRegistry { dir, descriptors };
        if registry.descriptors.is_empty() {
            for descriptor in built_in_descriptors() {
                registry.create(descriptor, true)?;
            }
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&AgentDescriptor> {
        self.descriptors.get(name)
    }

    pub fn list(&self) -> Vec<&AgentDescriptor> {
        self.descriptors.values().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Writes the descriptor's YAML file and, if `persist`, a markdown
    /// sidecar summarizing it for downstream tooling.
    pub fn create(&mut self, descriptor: AgentDescriptor, persist: bool) -> ScrumResult<AgentDescriptor> {
        if self.descriptors.contains_key(&descriptor.name) {
            return Err(ScrumError::conflict(format!(
                "agent '{}' already registered",
                descriptor.name
            )));
        }

        validate_descriptor(&descriptor, &descriptor.name)?;

        if persist {
            let yaml = serde_yaml::to_string(&descriptor)?;
            let path = self.dir.join(format!("{}.yaml", descriptor.name));
            scrumforge_data::atomic_write(&path, yaml.as_bytes())?;
            write_sidecar(&self.dir, &descriptor)?;
        }

        self.descriptors.insert(descriptor.name.clone(), descriptor.clone());
        Ok(descriptor)
    }
}

fn write_sidecar(dir: &Path, descriptor: &AgentDescriptor) -> ScrumResult<()> {
    let path = dir.join(format!("{}.md", descriptor.name));
    let body = format!(
        "# {}\n\n{} {}\n\nLanguage: {}\nFrameworks: {}\n",
        descriptor.display_name,
        descriptor.emoji,
        descriptor.short_label,
        descriptor.language,
        descriptor.frameworks.join(", "),
    );
    scrumforge_data::atomic_write(&path, body.as_bytes())
}

/// The built-in roster: project-manager, context-manager, and a set of
/// language/platform specialists.
pub fn built_in_descriptors() -> Vec<AgentDescriptor> {
    let specs: &[(&str, &str, &str, &[&str], &[&str])] = &[
        ("project-manager", "Project Manager", "generic", &[], &["deploy", "pipeline", "refactor", "review"]),
        ("context-manager", "Context Manager", "generic", &[], &[]),
        ("python", "Python Engineer", "python", &["django", "flask", "fastapi"], &["pytest", "coverage"]),
        ("go", "Go Engineer", "go", &["gin"], &["golang"]),
        ("frontend", "Frontend Engineer", "typescript", &["react", "vue", "angular"], &["javascript"]),
        ("test-runner", "Test Runner", "generic", &[], &["pytest", "jest", "unittest", "coverage"]),
        ("devops", "DevOps Engineer", "generic", &["docker", "kubernetes", "terraform"], &[]),
        ("database", "Database Engineer", "sql", &["postgres", "mongo"], &["sql"]),
        ("java", "Java Engineer", "java", &["spring"], &[]),
        ("ruby", "Ruby Engineer", "ruby", &["rails"], &[]),
        ("rust", "Rust Engineer", "rust", &["cargo"], &[]),
        ("swift", "Swift Engineer", "swift", &["ios"], &[]),
        ("kotlin", "Kotlin Engineer", "kotlin", &["android"], &[]),
        ("elixir", "Elixir Engineer", "elixir", &["phoenix"], &[]),
        ("haskell", "Haskell Engineer", "haskell", &["cabal"], &[]),
        ("r", "R Engineer", "r", &["ggplot"], &[]),
    ];

    specs
        .iter()
        .map(|(name, display_name, language, frameworks, skill_keywords)| AgentDescriptor {
            name: name.to_string(),
            display_name: display_name.to_string(),
            color: "white".to_string(),
            emoji: String::new(),
            short_label: name.chars().take(4).collect(),
            language: language.to_string(),
            frameworks: frameworks.iter().map(|s| s.to_string()).collect(),
            file_patterns: vec![],
            skill_keywords: skill_keywords.iter().map(|s| s.to_string()).collect(),
            allowed_tools: vec![],
            test_command: None,
            coverage_command: None,
            lint_command: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn seeds_built_ins_when_empty() {
        let dir = tempdir().unwrap();
        let registry = AgentRegistry::load(dir.path()).unwrap();
        assert!(registry.contains("python"));
        assert!(registry.contains("project-manager"));
    }

    #[test]
    fn create_refuses_duplicate() {
        let dir = tempdir().unwrap();
        let mut registry = AgentRegistry::load(dir.path()).unwrap();
        let err = registry
            .create(registry.get("python").unwrap().clone(), false)
            .unwrap_err();
        assert_eq!(err.kind(), scrumforge_data::ErrorKind::Conflict);
    }

    #[test]
    fn persisted_descriptor_reloads() {
        let dir = tempdir().unwrap();
        {
            let mut registry = AgentRegistry::load(dir.path()).unwrap();
            registry
                .create(
                    AgentDescriptor {
                        name: "scala".to_string(),
                        display_name: "Scala Engineer".to_string(),
                        color: String::new(),
                        emoji: String::new(),
                        short_label: "scal".to_string(),
                        language: "scala".to_string(),
                        frameworks: vec![],
                        file_patterns: vec![],
                        skill_keywords: vec![],
                        allowed_tools: vec![],
                        test_command: None,
                        coverage_command: None,
                        lint_command: None,
                    },
                    true,
                )
                .unwrap();
        }
        let reloaded = AgentRegistry::load(dir.path()).unwrap();
        assert!(reloaded.contains("scala"));
        assert!(dir.path().join("scala.md").exists());
    }
}
