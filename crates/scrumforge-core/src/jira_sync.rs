//! Jira Sync contract: the two shapes external sync code binds against. No
//! business logic lives here — Jira connectivity is not part of the core,
//! so the transport that polls or receives webhooks lives outside this
//! crate entirely.
//!
//! The inbound queue and outbound hook are grounded on the shapes already
//! established in this crate's own event plumbing: a plain FIFO for
//! inbound work mirrors `scrumforge_data::persistence`'s read-drain-apply
//! pattern, and the outbound hook reuses `scrumforge_data::events::EventSink`'s
//! `Box<dyn Fn(&ScrumEvent) + Send + Sync>` shape rather than inventing a
//! second callback convention.

use std::collections::VecDeque;

use scrumforge_data::ScrumEvent;

/// One externally reported item update, normalized before the SCRUM
/// Manager applies it. `internal_id` is `None` until the item has been
/// matched (or created) on this side.
#[derive(Debug, Clone)]
pub struct InboundItemUpdate {
    pub external_id: String,
    pub internal_id: Option<String>,
    pub field: String,
    pub new_value: String,
}

/// FIFO queue of inbound updates awaiting application. Transport code
/// (webhook receiver, polling loop) pushes; the façade drains and applies
/// each update through the ordinary `ScrumManager` operations.
#[derive(Debug, Default)]
pub struct InboundQueue {
    items: VecDeque<InboundItemUpdate>,
}

impl InboundQueue {
    pub fn new() -> Self {
        InboundQueue { items: VecDeque::new() }
    }

    pub fn push(&mut self, update: InboundItemUpdate) {
        self.items.push_back(update);
    }

    /// Removes and returns every queued update, oldest first.
    pub fn drain(&mut self) -> Vec<InboundItemUpdate> {
        self.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outbound hook signature: fired whenever a story or task changes state.
/// The core only calls it; it carries no knowledge of Jira's API shape.
pub type OutboundHook = Box<dyn Fn(&ScrumEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_oldest_first() {
        let mut queue = InboundQueue::new();
        queue.push(InboundItemUpdate {
            external_id: "JIRA-1".into(),
            internal_id: None,
            field: "status".into(),
            new_value: "Done".into(),
        });
        queue.push(InboundItemUpdate {
            external_id: "JIRA-2".into(),
            internal_id: Some("US-000001".into()),
            field: "priority".into(),
            new_value: "High".into(),
        });

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].external_id, "JIRA-1");
        assert_eq!(drained[1].external_id, "JIRA-2");
        assert!(queue.is_empty());
    }
}
