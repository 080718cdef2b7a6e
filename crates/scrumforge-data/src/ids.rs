//! Identifier Generator: `<PREFIX>-<6 chars from [A-Z0-9]>`, retried on
//! collision, falling back to a monotonic `AtomicU32` counter after enough
//! attempts, keeping a "static counter as last resort" shape for the
//! fallback path.

use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TOKEN_LEN: usize = 6;
const MAX_COLLISION_RETRIES: usize = 8;

static FALLBACK_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Which entity kind an ID belongs to; determines the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Story,
    Task,
    Bug,
    Sprint,
    Epic,
    Roadmap,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Story => "US",
            EntityKind::Task => "TASK",
            EntityKind::Bug => "BUG",
            EntityKind::Sprint => "SPRINT",
            EntityKind::Epic => "EPIC",
            EntityKind::Roadmap => "ROADMAP",
        }
    }
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Generates an ID of the given kind that does not collide with
/// `existing`. Retries a random 6-character token up to
/// `MAX_COLLISION_RETRIES` times; if every attempt collides (astronomically
/// unlikely), appends a monotonic counter suffix instead so the caller
/// always gets a fresh ID.
pub fn generate_id(kind: EntityKind, existing: &dyn Fn(&str) -> bool) -> String {
    let prefix = kind.prefix();
    for _ in 0..MAX_COLLISION_RETRIES {
        let candidate = format!("{prefix}-{}", random_token());
        if !existing(&candidate) {
            return candidate;
        }
    }

    loop {
        let n = FALLBACK_COUNTER.fetch_add(1, Ordering::SeqCst);
        let candidate = format!("{prefix}-F{n:06}");
        if !existing(&candidate) {
            tracing::warn!(
                kind = prefix,
                "id generator exhausted {} random retries, used monotonic fallback",
                MAX_COLLISION_RETRIES
            );
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_prefixed_ids() {
        let id = generate_id(EntityKind::Story, &|_| false);
        assert!(id.starts_with("US-"));
        assert_eq!(id.len(), "US-".len() + 6);
    }

    #[test]
    fn retries_on_collision_then_succeeds() {
        let mut seen: HashSet<String> = HashSet::new();
        for _ in 0..50 {
            let id = generate_id(EntityKind::Task, &|c| seen.contains(c));
            assert!(!seen.contains(&id), "duplicate id generated: {id}");
            seen.insert(id);
        }
    }

    #[test]
    fn falls_back_to_monotonic_counter_when_always_colliding() {
        let id = generate_id(EntityKind::Bug, &|_| true);
        assert!(id.starts_with("BUG-F"));
    }
}
