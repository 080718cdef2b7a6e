//! Shared building blocks for the entity model: the lenient status-accessor
//! rule (§4.3) and the `Priority` scale shared by stories, tasks and bugs.

use serde::{Deserialize, Deserializer, Serialize};

/// Converts a Rust PascalCase identifier (as given by `stringify!`) into the
/// SCREAMING_SNAKE_CASE symbolic form entities are persisted under, e.g.
/// `InProgress` -> `IN_PROGRESS`.
pub fn pascal_to_screaming_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() && i != 0 {
            out.push('_');
        }
        out.extend(ch.to_uppercase());
    }
    out
}

/// Implemented by every persisted status enum. Persisted data may predate
/// the introduction of a given variant, or may have been hand-edited; reads
/// tolerate both the canonical symbolic name and loose string forms
/// ("Done", "done", "DONE") and fall back to the most permissive variant
/// for anything unrecognized, emitting a warning rather than failing.
pub trait LenientStatus: Sized + Copy + 'static {
    fn symbolic_name(&self) -> String;
    fn most_permissive() -> Self;
    fn variants() -> &'static [Self];
}

/// Deserializer helper shared by every status field: accepts any casing /
/// separator style, degrades unknown values to `T::most_permissive()`.
pub fn deserialize_lenient_status<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: LenientStatus,
{
    let raw = String::deserialize(deserializer)?;
    let normalized = raw.to_uppercase().replace(['-', ' '], "_");
    for variant in T::variants() {
        if variant.symbolic_name() == normalized {
            return Ok(*variant);
        }
    }
    tracing::warn!(
        value = %raw,
        fallback = %T::most_permissive().symbolic_name(),
        "unrecognized status value, degrading to most permissive state"
    );
    Ok(T::most_permissive())
}

/// Defines a status enum together with its `LenientStatus` impl. Each enum
/// still derives `Serialize` normally (writes are always the canonical
/// symbolic form); only reads go through the tolerant path.
macro_rules! lenient_status_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident),+ $(,)? }
        permissive = $permissive:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                $crate::entities::common::deserialize_lenient_status(deserializer)
            }
        }

        impl $crate::entities::common::LenientStatus for $name {
            fn symbolic_name(&self) -> String {
                let ident = match self {
                    $(Self::$variant => stringify!($variant)),+
                };
                $crate::entities::common::pascal_to_screaming_snake(ident)
            }

            fn most_permissive() -> Self {
                Self::$permissive
            }

            fn variants() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$permissive
            }
        }
    };
}

pub(crate) use lenient_status_enum;

/// Priority shared by stories, tasks and bugs. Plain strict enum: unlike
/// the status fields, priority has no legacy string forms to tolerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// §4.3 create_bug: auto-assigned points when unset.
    pub fn default_story_points(&self) -> u8 {
        match self {
            Severity::Critical => 8,
            Severity::High => 5,
            Severity::Medium => 3,
            Severity::Low => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_conversion() {
        assert_eq!(pascal_to_screaming_snake("InProgress"), "IN_PROGRESS");
        assert_eq!(pascal_to_screaming_snake("Done"), "DONE");
        assert_eq!(pascal_to_screaming_snake("PrOpen"), "PR_OPEN");
    }
}
