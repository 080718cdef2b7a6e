pub mod executor;
pub mod invocation_log;
pub mod matcher;
pub mod registry;

pub use executor::{AgentExecutor, TaskOutcome, TaskResult};
pub use invocation_log::{InvocationLog, InvocationRecord};
pub use matcher::{match_task, template_for_technology, MatchResult};
pub use registry::{built_in_descriptors, AgentRegistry};
