use super::mappers::mutation_record_from_row;
use super::rows::MutationRow;
use crate::application::ports::MutationQueue;
use crate::domain::entities::{
    MutationPayload, MutationRecord, QueueContents, UndecodableMutation,
};
use crate::domain::value_objects::MutationId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::warn;

const INSERT_MUTATION: &str = r#"
    INSERT INTO mutation_queue (kind, payload, retry_count, created_at)
    VALUES (?1, ?2, 0, ?3)
"#;

const SELECT_ALL_MUTATIONS: &str = r#"
    SELECT id, kind, payload, retry_count, created_at
    FROM mutation_queue
    ORDER BY id ASC
"#;

const DELETE_MUTATION: &str = "DELETE FROM mutation_queue WHERE id = ?1";

const COUNT_MUTATIONS: &str = "SELECT COUNT(*) FROM mutation_queue";

const INCREMENT_RETRY: &str = r#"
    UPDATE mutation_queue
    SET retry_count = retry_count + 1
    WHERE id = ?1
    RETURNING retry_count
"#;

pub(crate) fn storage_error(err: sqlx::Error) -> AppError {
    AppError::Storage(err.to_string())
}

/// Mutation queue kept in the local SQLite file. Each call is one statement, so
/// a crash can never leave a half-written record behind.
#[derive(Clone)]
pub struct SqliteMutationQueue {
    pool: Pool<Sqlite>,
}

impl SqliteMutationQueue {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MutationQueue for SqliteMutationQueue {
    async fn add(&self, payload: &MutationPayload) -> Result<MutationId, AppError> {
        let encoded = serde_json::to_string(payload)?;
        let created_at = Utc::now().timestamp_millis();

        let result = sqlx::query(INSERT_MUTATION)
            .bind(payload.kind().as_str())
            .bind(&encoded)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        MutationId::new(result.last_insert_rowid()).map_err(AppError::Storage)
    }

    async fn load(&self) -> Result<QueueContents, AppError> {
        let rows = sqlx::query_as::<_, MutationRow>(SELECT_ALL_MUTATIONS)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        let mut contents = QueueContents::default();
        for row in rows {
            let (raw_id, kind, retry_count) = (row.id, row.kind.clone(), row.retry_count);
            match mutation_record_from_row(row) {
                Ok(record) => contents.records.push(record),
                Err(err) => match MutationId::new(raw_id) {
                    Ok(id) => contents.undecodable.push(UndecodableMutation {
                        id,
                        kind,
                        retry_count: u32::try_from(retry_count).unwrap_or(u32::MAX),
                        error: err.to_string(),
                    }),
                    Err(_) => {
                        warn!(row_id = raw_id, error = %err, "skipping queue row with invalid id")
                    }
                },
            }
        }
        Ok(contents)
    }

    async fn get_all(&self) -> Result<Vec<MutationRecord>, AppError> {
        Ok(self.load().await?.records)
    }

    async fn remove(&self, id: MutationId) -> Result<bool, AppError> {
        let result = sqlx::query(DELETE_MUTATION)
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u32, AppError> {
        let (count,): (i64,) = sqlx::query_as(COUNT_MUTATIONS)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn increment_retry(&self, id: MutationId) -> Result<u32, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(INCREMENT_RETRY)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        match row {
            Some((retry_count,)) => Ok(u32::try_from(retry_count).unwrap_or(u32::MAX)),
            None => Err(AppError::not_found(format!("queued mutation {id}"))),
        }
    }
}
