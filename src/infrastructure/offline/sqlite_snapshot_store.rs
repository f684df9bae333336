use super::mappers::snapshot_from_row;
use super::rows::SnapshotRow;
use super::sqlite_queue::storage_error;
use crate::application::ports::SnapshotStore;
use crate::domain::entities::OptimisticSnapshot;
use crate::domain::value_objects::{JobId, MutationId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

const SELECT_LAYERS: &str = r#"
    SELECT entity_id, mutation_id, data, created_at, confirmed_at
    FROM optimistic_snapshots
    WHERE entity_id = ?1
    ORDER BY mutation_id ASC
"#;

const SELECT_ALL_LAYERS: &str = r#"
    SELECT entity_id, mutation_id, data, created_at, confirmed_at
    FROM optimistic_snapshots
    ORDER BY entity_id ASC, mutation_id ASC
"#;

const UPSERT_LAYER: &str = r#"
    INSERT INTO optimistic_snapshots (entity_id, mutation_id, data, created_at, confirmed_at)
    VALUES (?1, ?2, ?3, ?4, NULL)
    ON CONFLICT(entity_id, mutation_id) DO UPDATE SET
        data = excluded.data,
        created_at = excluded.created_at,
        confirmed_at = NULL
"#;

const CONFIRM_MUTATION: &str = r#"
    UPDATE optimistic_snapshots
    SET confirmed_at = ?2
    WHERE mutation_id = ?1 AND confirmed_at IS NULL
"#;

const DISCARD_MUTATION: &str = "DELETE FROM optimistic_snapshots WHERE mutation_id = ?1";

const PURGE_CONFIRMED: &str = "DELETE FROM optimistic_snapshots WHERE confirmed_at IS NOT NULL";

/// Overlays `patch` on `base` key by key; non-object values replace outright.
fn merge_view(base: Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (key, value) in patch {
                base.insert(key.clone(), value.clone());
            }
            Value::Object(base)
        }
        (_, patch) => patch.clone(),
    }
}

fn stack(below: OptimisticSnapshot, above: OptimisticSnapshot) -> OptimisticSnapshot {
    OptimisticSnapshot {
        entity_id: above.entity_id,
        mutation_id: above.mutation_id,
        data: merge_view(below.data, &above.data),
        created_at: below.created_at,
        confirmed_at: below
            .confirmed_at
            .zip(above.confirmed_at)
            .map(|(a, b)| a.max(b)),
    }
}

/// Folds one entity's layers, oldest mutation first.
fn compose(rows: Vec<SnapshotRow>) -> Result<Option<OptimisticSnapshot>, AppError> {
    let mut layers = rows.into_iter().map(snapshot_from_row);
    let Some(first) = layers.next().transpose()? else {
        return Ok(None);
    };
    layers
        .try_fold(first, |acc, layer| layer.map(|layer| stack(acc, layer)))
        .map(Some)
}

#[derive(Clone)]
pub struct SqliteSnapshotStore {
    pool: Pool<Sqlite>,
}

impl SqliteSnapshotStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn upsert(
        &self,
        entity_id: &JobId,
        mutation_id: MutationId,
        data: &Value,
    ) -> Result<(), AppError> {
        sqlx::query(UPSERT_LAYER)
            .bind(entity_id.as_str())
            .bind(mutation_id.value())
            .bind(serde_json::to_string(data)?)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get(&self, entity_id: &JobId) -> Result<Option<OptimisticSnapshot>, AppError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(SELECT_LAYERS)
            .bind(entity_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        compose(rows)
    }

    async fn list(&self) -> Result<Vec<OptimisticSnapshot>, AppError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(SELECT_ALL_LAYERS)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        let mut groups: Vec<Vec<SnapshotRow>> = Vec::new();
        for row in rows {
            match groups.last_mut() {
                Some(group) if group[0].entity_id == row.entity_id => group.push(row),
                _ => groups.push(vec![row]),
            }
        }

        let mut snapshots = Vec::with_capacity(groups.len());
        for group in groups {
            if let Some(snapshot) = compose(group)? {
                snapshots.push(snapshot);
            }
        }
        snapshots.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.entity_id.as_str().cmp(b.entity_id.as_str()))
        });
        Ok(snapshots)
    }

    async fn confirm_mutation(&self, mutation_id: MutationId) -> Result<u64, AppError> {
        let result = sqlx::query(CONFIRM_MUTATION)
            .bind(mutation_id.value())
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn discard_mutation(&self, mutation_id: MutationId) -> Result<u64, AppError> {
        let result = sqlx::query(DISCARD_MUTATION)
            .bind(mutation_id.value())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn purge_confirmed(&self) -> Result<u64, AppError> {
        let result = sqlx::query(PURGE_CONFIRMED)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected())
    }
}
