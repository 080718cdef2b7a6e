//! Agent descriptor schema validation: compiles an embedded `jsonschema`
//! Draft7 document and validates an `AgentDescriptor` YAML file against it.
//! Uses a single embedded schema rather than a home-directory-override
//! lookup, since descriptors have no per-install override path in this
//! domain.

use jsonschema::{Draft, JSONSchema};
use scrumforge_data::{ScrumError, ScrumResult};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub fn new() -> Self {
        ValidationResult {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, path: String, message: String) {
        self.valid = false;
        self.errors.push(ValidationError { path, message });
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

pub struct SchemaValidator {
    schema: JSONSchema,
}

impl SchemaValidator {
    pub fn from_file<P: AsRef<Path>>(schema_path: P) -> ScrumResult<Self> {
        let schema_content = fs::read_to_string(schema_path)
            .map_err(|e| ScrumError::validation(format!("failed to read schema: {e}")))?;
        let schema_json: Value = serde_json::from_str(&schema_content)
            .map_err(|e| ScrumError::validation(format!("invalid schema JSON: {e}")))?;
        Self::from_value(&schema_json)
    }

    fn from_value(schema_json: &Value) -> ScrumResult<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema_json)
            .map_err(|e| ScrumError::validation(format!("failed to compile schema: {e}")))?;
        Ok(SchemaValidator { schema: compiled })
    }

    /// The embedded agent descriptor schema (§3 Agent descriptor fields).
    pub fn agent_descriptor_schema() -> ScrumResult<Self> {
        let schema_json: Value = serde_json::from_str(include_str!(
            "../schemas/agent_descriptor.schema.json"
        ))
        .map_err(|e| ScrumError::validation(format!("invalid embedded schema: {e}")))?;
        Self::from_value(&schema_json)
    }

    pub fn validate_yaml<P: AsRef<Path>>(&self, yaml_path: P) -> ScrumResult<ValidationResult> {
        let yaml_content = fs::read_to_string(&yaml_path)
            .map_err(|e| ScrumError::validation(format!("failed to read YAML: {e}")))?;
        let yaml_value: Value = serde_yaml::from_str(&yaml_content)
            .map_err(|e| ScrumError::validation(format!("invalid YAML: {e}")))?;
        self.validate_value(&yaml_value)
    }

    pub fn validate_value(&self, value: &Value) -> ScrumResult<ValidationResult> {
        let mut result = ValidationResult::new();
        if let Err(errors) = self.schema.validate(value) {
            for error in errors {
                result.add_error(error.instance_path.to_string(), error.to_string());
            }
        }
        Ok(result)
    }

    pub fn validate_agent_descriptor(yaml_path: impl AsRef<Path>) -> ScrumResult<ValidationResult> {
        let validator = Self::agent_descriptor_schema()?;
        validator.validate_yaml(yaml_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn valid_descriptor_passes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name: python\ndisplay_name: Python Engineer\nlanguage: python\n"
        )
        .unwrap();
        let result = SchemaValidator::validate_agent_descriptor(file.path()).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn missing_required_field_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name: python\n").unwrap();
        let result = SchemaValidator::validate_agent_descriptor(file.path()).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn bad_name_casing_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name: Python\ndisplay_name: Python Engineer\nlanguage: python\n"
        )
        .unwrap();
        let result = SchemaValidator::validate_agent_descriptor(file.path()).unwrap();
        assert!(!result.is_valid());
    }
}
