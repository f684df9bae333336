use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    CompleteJob,
    MarkJobPaid,
    BatchMarkPaid,
    RescheduleJob,
    SkipJob,
    UpdateJobNotes,
}

impl MutationKind {
    pub const ALL: [MutationKind; 6] = [
        MutationKind::CompleteJob,
        MutationKind::MarkJobPaid,
        MutationKind::BatchMarkPaid,
        MutationKind::RescheduleJob,
        MutationKind::SkipJob,
        MutationKind::UpdateJobNotes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::CompleteJob => "CompleteJob",
            MutationKind::MarkJobPaid => "MarkJobPaid",
            MutationKind::BatchMarkPaid => "BatchMarkPaid",
            MutationKind::RescheduleJob => "RescheduleJob",
            MutationKind::SkipJob => "SkipJob",
            MutationKind::UpdateJobNotes => "UpdateJobNotes",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MutationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown mutation kind: {s}"))
    }
}
