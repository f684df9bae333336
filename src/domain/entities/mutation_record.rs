use super::MutationPayload;
use crate::domain::value_objects::{MutationId, MutationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One deferred write waiting in the durable queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationRecord {
    pub id: MutationId,
    pub payload: MutationPayload,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
}

impl MutationRecord {
    pub fn new(
        id: MutationId,
        payload: MutationPayload,
        created_at: DateTime<Utc>,
        retry_count: u32,
    ) -> Self {
        Self {
            id,
            payload,
            created_at,
            retry_count,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.payload.kind()
    }
}

/// Queued row whose payload no longer decodes, e.g. one written by a different
/// app version. It can only be retried until it is abandoned.
#[derive(Debug, Clone, PartialEq)]
pub struct UndecodableMutation {
    pub id: MutationId,
    pub kind: String,
    pub retry_count: u32,
    pub error: String,
}

/// Queue contents in insertion order, split by whether the payload decodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueContents {
    pub records: Vec<MutationRecord>,
    pub undecodable: Vec<UndecodableMutation>,
}

impl QueueContents {
    pub fn len(&self) -> usize {
        self.records.len() + self.undecodable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.undecodable.is_empty()
    }
}
