use crate::domain::value_objects::{JobId, MutationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Locally applied view of one job. Read back as the composition of every
/// layer still held for the job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimisticSnapshot {
    pub entity_id: JobId,
    /// Newest mutation with a layer on this entity.
    pub mutation_id: MutationId,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    /// Set only once every layer is confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl OptimisticSnapshot {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }
}
