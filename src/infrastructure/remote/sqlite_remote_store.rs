use crate::application::ports::RemoteStore;
use crate::domain::entities::{Job, JobCompletion, NewJob};
use crate::domain::value_objects::{
    CustomerId, JobId, JobStatus, PaymentMethod, PaymentStatus, UserId,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Row, Sqlite, sqlite::SqliteRow};

const JOB_COLUMNS: &str = "id, owner_id, customer_id, scheduled_date, status, payment_status, \
    payment_method, price, amount_collected, completed_at, completed_by, paid_at, photo_url, \
    notes, helper_id, helper_payment";

fn optional_timestamp(row: &SqliteRow, column: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    row.try_get::<Option<i64>, _>(column)?
        .map(|value| {
            DateTime::<Utc>::from_timestamp_millis(value)
                .ok_or_else(|| {
                    AppError::DeserializationError(format!("Invalid {column} timestamp"))
                })
        })
        .transpose()
}

fn optional_user(row: &SqliteRow, column: &str) -> Result<Option<UserId>, AppError> {
    row.try_get::<Option<String>, _>(column)?
        .map(|value| UserId::new(value).map_err(AppError::DeserializationError))
        .transpose()
}

fn map_job(row: &SqliteRow) -> Result<Job, AppError> {
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;

    Ok(Job {
        id: JobId::new(row.try_get("id")?).map_err(AppError::DeserializationError)?,
        owner_id: UserId::new(row.try_get("owner_id")?).map_err(AppError::DeserializationError)?,
        customer_id: CustomerId::new(row.try_get("customer_id")?)
            .map_err(AppError::DeserializationError)?,
        scheduled_date: row.try_get("scheduled_date")?,
        status: JobStatus::from(status.as_str()),
        payment_status: PaymentStatus::from(payment_status.as_str()),
        payment_method: row
            .try_get::<Option<String>, _>("payment_method")?
            .map(PaymentMethod::from),
        price: row.try_get("price")?,
        amount_collected: row.try_get("amount_collected")?,
        completed_at: optional_timestamp(row, "completed_at")?,
        completed_by: optional_user(row, "completed_by")?,
        paid_at: optional_timestamp(row, "paid_at")?,
        photo_url: row.try_get("photo_url")?,
        notes: row.try_get("notes")?,
        helper_id: optional_user(row, "helper_id")?,
        helper_payment: row.try_get("helper_payment")?,
    })
}

/// Remote store adapter speaking SQL to the system of record. Every write is
/// guarded by a predicate on the row's current state.
#[derive(Clone)]
pub struct SqliteRemoteStore {
    pool: Pool<Sqlite>,
}

impl SqliteRemoteStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

/// Administrative writes and reads used to seed and inspect the system of
/// record. Nothing on the replay path calls these; the ports cover that.
impl SqliteRemoteStore {
    /// Gives `assignee_id` an outstanding task on the job. Completion clears it.
    pub async fn assign_task(&self, job_id: &JobId, assignee_id: &UserId) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO task_assignments (job_id, assignee_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(job_id.as_str())
        .bind(assignee_id.as_str())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stores the share of collected money the owner pays this helper.
    pub async fn set_commission_percent(
        &self,
        owner_id: &UserId,
        helper_id: &UserId,
        percent: f64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO commission_settings (owner_id, helper_id, percent)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(owner_id, helper_id) DO UPDATE SET percent = excluded.percent
            "#,
        )
        .bind(owner_id.as_str())
        .bind(helper_id.as_str())
        .bind(percent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Every job of the customer, earliest scheduled first.
    pub async fn list_jobs_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE customer_id = ?1 \
             ORDER BY scheduled_date ASC, id ASC"
        ))
        .bind(customer_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_job).collect()
    }
}

#[async_trait]
impl RemoteStore for SqliteRemoteStore {
    async fn fetch_job(&self, job_id: &JobId) -> Result<Option<Job>, AppError> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"))
            .bind(job_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_job).transpose()
    }

    async fn complete_pending_job(
        &self,
        job_id: &JobId,
        completion: &JobCompletion,
    ) -> Result<Option<Job>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE jobs
            SET status = 'completed',
                payment_status = ?2,
                payment_method = ?3,
                amount_collected = ?4,
                completed_at = ?5,
                completed_by = ?6,
                photo_url = COALESCE(?7, photo_url)
            WHERE id = ?1 AND status = 'pending'
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id.as_str())
        .bind(completion.payment_status.as_str())
        .bind(completion.payment_method.as_ref().map(|m| m.as_str().to_string()))
        .bind(completion.amount_collected)
        .bind(completion.completed_at.timestamp_millis())
        .bind(completion.completed_by.as_ref().map(|u| u.as_str().to_string()))
        .bind(completion.photo_url.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_job).transpose()
    }

    async fn mark_unpaid_jobs_paid(
        &self,
        job_ids: &[JobId],
        method: &PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Vec<JobId>, AppError> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE jobs SET payment_status = 'paid', payment_method = ");
        builder.push_bind(method.as_str().to_string());
        builder.push(", paid_at = ");
        builder.push_bind(paid_at.timestamp_millis());
        builder.push(" WHERE payment_status = 'unpaid' AND id IN (");
        let mut separated = builder.separated(", ");
        for job_id in job_ids {
            separated.push_bind(job_id.as_str().to_string());
        }
        separated.push_unseparated(") RETURNING id");

        let rows: Vec<(String,)> = builder.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|(id,)| JobId::new(id).map_err(AppError::DeserializationError))
            .collect()
    }

    async fn set_scheduled_date(&self, job_id: &JobId, date: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE jobs SET scheduled_date = ?2 WHERE id = ?1")
            .bind(job_id.as_str())
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_notes(&self, job_id: &JobId, notes: Option<&str>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE jobs SET notes = ?2 WHERE id = ?1")
            .bind(job_id.as_str())
            .bind(notes)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_task_assignments(&self, job_id: &JobId) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM task_assignments WHERE job_id = ?1")
            .bind(job_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commission_percent(
        &self,
        owner_id: &UserId,
        helper_id: &UserId,
    ) -> Result<Option<f64>, AppError> {
        let row: Option<(f64,)> = sqlx::query_as(
            "SELECT percent FROM commission_settings WHERE owner_id = ?1 AND helper_id = ?2",
        )
        .bind(owner_id.as_str())
        .bind(helper_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(percent,)| percent))
    }

    async fn record_helper_payment(
        &self,
        job_id: &JobId,
        helper_id: &UserId,
        amount: f64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET helper_id = ?2, helper_payment = ?3
            WHERE id = ?1 AND helper_payment IS NULL
            "#,
        )
        .bind(job_id.as_str())
        .bind(helper_id.as_str())
        .bind(amount)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_job(&self, job: &NewJob) -> Result<Job, AppError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO jobs (
                id, owner_id, customer_id, scheduled_date, status, payment_status, price, created_at
            ) VALUES (?1, ?2, ?3, ?4, 'pending', 'unpaid', ?5, ?6)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job.id.as_str())
        .bind(job.owner_id.as_str())
        .bind(job.customer_id.as_str())
        .bind(&job.scheduled_date)
        .bind(job.price)
        .bind(Utc::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        map_job(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::ConnectionPool;

    async fn setup_store() -> SqliteRemoteStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate_remote().await.unwrap();
        SqliteRemoteStore::new(pool.get_pool().clone())
    }

    fn new_job(id: &str) -> NewJob {
        NewJob {
            id: JobId::new(id.into()).unwrap(),
            owner_id: UserId::new("owner".into()).unwrap(),
            customer_id: CustomerId::new("C1".into()).unwrap(),
            scheduled_date: "2025-01-06".into(),
            price: 25.0,
        }
    }

    fn completion() -> JobCompletion {
        JobCompletion {
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            amount_collected: 30.0,
            completed_at: Utc::now(),
            completed_by: None,
            photo_url: Some("photos/j1.jpg".into()),
        }
    }

    #[tokio::test]
    async fn completion_only_applies_to_pending_jobs() {
        let store = setup_store().await;
        let job = store.insert_job(&new_job("J1")).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);

        let completed = store
            .complete_pending_job(&job.id, &completion())
            .await
            .unwrap()
            .expect("pending job completes");
        assert_eq!(completed.status, JobStatus::Completed);
        assert_eq!(completed.amount_collected, Some(30.0));
        assert_eq!(completed.photo_url.as_deref(), Some("photos/j1.jpg"));

        let replay = store.complete_pending_job(&job.id, &completion()).await.unwrap();
        assert!(replay.is_none());
    }

    #[tokio::test]
    async fn mark_paid_skips_jobs_that_are_not_unpaid() {
        let store = setup_store().await;
        store.insert_job(&new_job("J1")).await.unwrap();
        store.insert_job(&new_job("J2")).await.unwrap();
        let ids = vec![
            JobId::new("J1".into()).unwrap(),
            JobId::new("J2".into()).unwrap(),
        ];

        let first = store
            .mark_unpaid_jobs_paid(&ids[..1], &PaymentMethod::Cash, Utc::now())
            .await
            .unwrap();
        assert_eq!(first, vec![ids[0].clone()]);

        let second = store
            .mark_unpaid_jobs_paid(&ids, &PaymentMethod::Card, Utc::now())
            .await
            .unwrap();
        assert_eq!(second, vec![ids[1].clone()]);

        let j1 = store.fetch_job(&ids[0]).await.unwrap().unwrap();
        assert_eq!(j1.payment_method, Some(PaymentMethod::Cash));
        assert!(j1.paid_at.is_some());
    }

    #[tokio::test]
    async fn helper_payment_is_recorded_once() {
        let store = setup_store().await;
        let job = store.insert_job(&new_job("J1")).await.unwrap();
        let helper = UserId::new("helper".into()).unwrap();

        assert!(store.record_helper_payment(&job.id, &helper, 12.5).await.unwrap());
        assert!(!store.record_helper_payment(&job.id, &helper, 12.5).await.unwrap());
        let stored = store.fetch_job(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.helper_payment, Some(12.5));
    }

    #[tokio::test]
    async fn commission_lookup_and_assignment_cleanup() {
        let store = setup_store().await;
        let job = store.insert_job(&new_job("J1")).await.unwrap();
        let owner = UserId::new("owner".into()).unwrap();
        let helper = UserId::new("helper".into()).unwrap();

        assert_eq!(store.commission_percent(&owner, &helper).await.unwrap(), None);
        store.set_commission_percent(&owner, &helper, 40.0).await.unwrap();
        assert_eq!(
            store.commission_percent(&owner, &helper).await.unwrap(),
            Some(40.0)
        );

        store.assign_task(&job.id, &helper).await.unwrap();
        assert_eq!(store.delete_task_assignments(&job.id).await.unwrap(), 1);
        assert_eq!(store.delete_task_assignments(&job.id).await.unwrap(), 0);
    }
}
