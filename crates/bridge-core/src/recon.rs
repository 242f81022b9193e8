use std::collections::HashMap;
use std::sync::Mutex;

/// Result of recording an observed status against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Same status as the previous observation; nothing to do.
    Unchanged,
    /// First sighting, or the status moved since last poll.
    Changed,
}

/// Last-observed-status ledger consulted by the reconciliation poller.
///
/// `observe` must record the new status and report whether it changed in one
/// atomic step, and it must record BEFORE the caller acts on the change: a
/// failed downstream transition is then attempted at most once per status
/// value instead of retrying on every poll cycle.
pub trait ReconciliationStore: Send + Sync {
    fn observe(&self, issue: &str, status: &str) -> Observation;

    fn last_status(&self, issue: &str) -> Option<String>;
}

/// In-memory ledger. No eviction; entries live for the process lifetime,
/// which bounds memory only because deployments of this bridge are
/// short-lived. A durable implementation can be swapped in through the trait
/// without touching the poller.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReconciliationStore for MemoryLedger {
    fn observe(&self, issue: &str, status: &str) -> Observation {
        let mut entries = self.entries.lock().expect("ledger mutex poisoned");
        match entries.insert(issue.to_owned(), status.to_owned()) {
            Some(previous) if previous == status => Observation::Unchanged,
            _ => Observation::Changed,
        }
    }

    fn last_status(&self, issue: &str) -> Option<String> {
        let entries = self.entries.lock().expect("ledger mutex poisoned");
        entries.get(issue).cloned()
    }
}
