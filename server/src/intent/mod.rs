mod intent_ledger;
mod intent_tracker;

pub use intent_ledger::IntentLedger;
pub use intent_tracker::IntentTracker;
