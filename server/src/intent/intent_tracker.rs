use std::collections::HashMap;

use log::debug;

use pairup_shared::{Button, ContentId, IntentCount, IntentCountUpdate};

use crate::intent::IntentLedger;

#[derive(Clone, Copy, Default)]
struct Toggles {
    a: bool,
    b: bool,
}

impl Toggles {
    fn get_mut(&mut self, button: Button) -> &mut bool {
        match button {
            Button::A => &mut self.a,
            Button::B => &mut self.b,
        }
    }
}

/// Intents held by a single connection. A connection contributes at most
/// one count per (content, button).
#[derive(Default)]
pub struct IntentTracker {
    toggles: HashMap<ContentId, Toggles>,
}

impl IntentTracker {
    pub fn new() -> Self {
        Self {
            toggles: HashMap::new(),
        }
    }

    pub fn request(&mut self, content_id: &ContentId, ledger: &mut IntentLedger) -> IntentCount {
        self.toggles.entry(content_id.clone()).or_default();
        ledger.count(content_id)
    }

    /// Returns the counts after the change. Expressing the same intent twice
    /// leaves them unchanged.
    pub fn express(
        &mut self,
        content_id: &ContentId,
        button: Button,
        ledger: &mut IntentLedger,
    ) -> IntentCount {
        let held = self.toggles.entry(content_id.clone()).or_default().get_mut(button);
        if *held {
            debug!("Intent {} already expressed on {}", button, content_id);
            return ledger.count(content_id);
        }
        *held = true;
        ledger.increment(content_id, button)
    }

    /// Returns the counts after the change. Cancelling an intent that was
    /// never expressed leaves them unchanged.
    pub fn cancel(
        &mut self,
        content_id: &ContentId,
        button: Button,
        ledger: &mut IntentLedger,
    ) -> IntentCount {
        let held = self.toggles.entry(content_id.clone()).or_default().get_mut(button);
        if !*held {
            debug!("Intent {} was not expressed on {}", button, content_id);
            return ledger.count(content_id);
        }
        *held = false;
        ledger.decrement(content_id, button)
    }

    pub fn holds(&self, content_id: &ContentId, button: Button) -> bool {
        self.toggles
            .get(content_id)
            .is_some_and(|toggles| match button {
                Button::A => toggles.a,
                Button::B => toggles.b,
            })
    }

    /// Releases every intent this connection holds. Returns the new counts
    /// of each content that changed.
    pub fn clean_up(&mut self, ledger: &mut IntentLedger) -> Vec<IntentCountUpdate> {
        let mut updates = Vec::new();
        let mut toggles: Vec<(ContentId, Toggles)> = self.toggles.drain().collect();
        toggles.sort_by(|(left, _), (right, _)| left.cmp(right));

        for (content_id, held) in toggles {
            if !held.a && !held.b {
                continue;
            }
            let mut count = ledger.count(&content_id);
            if held.a {
                count = ledger.decrement(&content_id, Button::A);
            }
            if held.b {
                count = ledger.decrement(&content_id, Button::B);
            }
            updates.push(IntentCountUpdate::new(&content_id, &count));
        }

        updates
    }
}
