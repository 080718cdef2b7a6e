//! Small CLI-only parsers for enum flags. `Priority`/`Severity` carry no
//! `FromStr` impl in `scrumforge-data` since nothing in the core parses them
//! from text; only this command surface does.

use anyhow::{bail, Result};
use scrumforge_data::{Priority, Severity};

pub fn parse_priority(s: &str) -> Result<Priority> {
    Ok(match s.to_lowercase().as_str() {
        "critical" => Priority::Critical,
        "high" => Priority::High,
        "medium" => Priority::Medium,
        "low" => Priority::Low,
        other => bail!("unknown priority '{other}', expected critical|high|medium|low"),
    })
}

pub fn parse_severity(s: &str) -> Result<Severity> {
    Ok(match s.to_lowercase().as_str() {
        "critical" => Severity::Critical,
        "high" => Severity::High,
        "medium" => Severity::Medium,
        "low" => Severity::Low,
        other => bail!("unknown severity '{other}', expected critical|high|medium|low"),
    })
}
