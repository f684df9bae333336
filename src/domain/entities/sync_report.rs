use serde::{Deserialize, Serialize};

/// Aggregate counts of one drain cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    pub synced_count: u32,
    pub retried_count: u32,
    pub abandoned_count: u32,
    pub pending_count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyDraining,
    Offline,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Drained(SyncReport),
}

impl SyncOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Drained(report) => Some(report),
            SyncOutcome::Skipped(_) => None,
        }
    }
}
