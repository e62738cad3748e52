use std::collections::HashMap;

use pairup_shared::{Button, ContentId, IntentCount};

/// Process-wide A/B intent counts, keyed by content
#[derive(Default)]
pub struct IntentLedger {
    counts: HashMap<ContentId, IntentCount>,
}

impl IntentLedger {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Returns the counts for `content_id`, starting it at zero if unseen
    pub fn count(&mut self, content_id: &ContentId) -> IntentCount {
        *self.counts.entry(content_id.clone()).or_default()
    }

    /// Read-only lookup, does not create an entry
    pub fn peek(&self, content_id: &ContentId) -> Option<IntentCount> {
        self.counts.get(content_id).copied()
    }

    pub(crate) fn increment(&mut self, content_id: &ContentId, button: Button) -> IntentCount {
        let count = self.counts.entry(content_id.clone()).or_default();
        match button {
            Button::A => count.a = count.a.saturating_add(1),
            Button::B => count.b = count.b.saturating_add(1),
        }
        *count
    }

    pub(crate) fn decrement(&mut self, content_id: &ContentId, button: Button) -> IntentCount {
        let count = self.counts.entry(content_id.clone()).or_default();
        match button {
            Button::A => count.a = count.a.saturating_sub(1),
            Button::B => count.b = count.b.saturating_sub(1),
        }
        *count
    }
}
