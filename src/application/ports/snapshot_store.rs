use crate::domain::entities::OptimisticSnapshot;
use crate::domain::value_objects::{JobId, MutationId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Optimistic overlays, one layer per `(entity, mutation)`. Reads compose the
/// layers of an entity in mutation order, so each layer lives and dies with
/// its own mutation.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn upsert(
        &self,
        entity_id: &JobId,
        mutation_id: MutationId,
        data: &Value,
    ) -> Result<(), AppError>;
    async fn get(&self, entity_id: &JobId) -> Result<Option<OptimisticSnapshot>, AppError>;
    async fn list(&self) -> Result<Vec<OptimisticSnapshot>, AppError>;
    /// Marks every layer written by `mutation_id` confirmed. Returns the
    /// number of layers changed.
    async fn confirm_mutation(&self, mutation_id: MutationId) -> Result<u64, AppError>;
    /// Drops every layer written by `mutation_id`.
    async fn discard_mutation(&self, mutation_id: MutationId) -> Result<u64, AppError>;
    async fn purge_confirmed(&self) -> Result<u64, AppError>;
}
