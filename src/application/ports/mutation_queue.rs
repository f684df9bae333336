use crate::domain::entities::{MutationPayload, MutationRecord, QueueContents};
use crate::domain::value_objects::MutationId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable FIFO of pending mutations. Every method is a single atomic write or
/// read against storage that survives a process restart.
#[async_trait]
pub trait MutationQueue: Send + Sync {
    async fn add(&self, payload: &MutationPayload) -> Result<MutationId, AppError>;
    /// All records in insertion order. No deduplication across entities. Rows
    /// whose payload cannot be decoded come back separately instead of failing
    /// the whole read.
    async fn load(&self) -> Result<QueueContents, AppError>;
    /// Decodable records only, in insertion order.
    async fn get_all(&self) -> Result<Vec<MutationRecord>, AppError>;
    /// Returns false when the record was already gone.
    async fn remove(&self, id: MutationId) -> Result<bool, AppError>;
    async fn count(&self) -> Result<u32, AppError>;
    /// Returns the retry count after the increment.
    async fn increment_retry(&self, id: MutationId) -> Result<u32, AppError>;
}
