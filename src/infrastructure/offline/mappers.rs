use super::rows::{MutationRow, SnapshotRow};
use crate::domain::entities::{MutationPayload, MutationRecord, OptimisticSnapshot};
use crate::domain::value_objects::{JobId, MutationId};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

pub fn timestamp_from_millis(value: i64, column: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid {column} timestamp")))
}

pub fn mutation_record_from_row(row: MutationRow) -> Result<MutationRecord, AppError> {
    let id = MutationId::new(row.id).map_err(AppError::DeserializationError)?;
    let payload: MutationPayload = serde_json::from_str(&row.payload).map_err(|err| {
        AppError::DeserializationError(format!("mutation {} ({}): {err}", row.id, row.kind))
    })?;
    let retry_count = u32::try_from(row.retry_count).unwrap_or(u32::MAX);

    Ok(MutationRecord::new(
        id,
        payload,
        timestamp_from_millis(row.created_at, "created_at")?,
        retry_count,
    ))
}

pub fn snapshot_from_row(row: SnapshotRow) -> Result<OptimisticSnapshot, AppError> {
    Ok(OptimisticSnapshot {
        entity_id: JobId::new(row.entity_id).map_err(AppError::DeserializationError)?,
        mutation_id: MutationId::new(row.mutation_id).map_err(AppError::DeserializationError)?,
        data: serde_json::from_str(&row.data)
            .map_err(|err| AppError::DeserializationError(err.to_string()))?,
        created_at: timestamp_from_millis(row.created_at, "created_at")?,
        confirmed_at: row
            .confirmed_at
            .map(|value| timestamp_from_millis(value, "confirmed_at"))
            .transpose()?,
    })
}
