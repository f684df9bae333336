use serde::{Deserialize, Serialize};
use std::fmt;

/// Queue position assigned at enqueue time. Strictly increasing, so it doubles
/// as the FIFO ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutationId(i64);

impl MutationId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Mutation id must be positive".to_string());
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MutationId> for i64 {
    fn from(id: MutationId) -> Self {
        id.0
    }
}
