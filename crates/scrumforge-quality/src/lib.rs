pub mod gates;
pub mod pipeline;
pub mod schema_validator;

pub use gates::{create_default_pipeline, AgentDescriptorSchemaGate, CoverageGate, DependencyCycleGate};
pub use pipeline::{GateContext, GateResult, QualityGate, QualityPipeline, QualityReport};
pub use schema_validator::{SchemaValidator, ValidationError, ValidationResult};
