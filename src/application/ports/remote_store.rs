use crate::domain::entities::{Job, JobCompletion, NewJob};
use crate::domain::value_objects::{JobId, PaymentMethod, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Conditional-write surface of the remote system of record. Guarded writes
/// report a predicate miss through their return value, never by erroring.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_job(&self, job_id: &JobId) -> Result<Option<Job>, AppError>;

    /// Completes the job only where its status is still `pending`.
    async fn complete_pending_job(
        &self,
        job_id: &JobId,
        completion: &JobCompletion,
    ) -> Result<Option<Job>, AppError>;

    /// Marks paid only the jobs whose payment status is still `unpaid`; returns
    /// the ids actually updated.
    async fn mark_unpaid_jobs_paid(
        &self,
        job_ids: &[JobId],
        method: &PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Vec<JobId>, AppError>;

    async fn set_scheduled_date(&self, job_id: &JobId, date: &str) -> Result<bool, AppError>;

    async fn set_notes(&self, job_id: &JobId, notes: Option<&str>) -> Result<bool, AppError>;

    async fn delete_task_assignments(&self, job_id: &JobId) -> Result<u64, AppError>;

    async fn commission_percent(
        &self,
        owner_id: &UserId,
        helper_id: &UserId,
    ) -> Result<Option<f64>, AppError>;

    /// Records the helper payment only where none has been recorded yet.
    async fn record_helper_payment(
        &self,
        job_id: &JobId,
        helper_id: &UserId,
        amount: f64,
    ) -> Result<bool, AppError>;

    async fn insert_job(&self, job: &NewJob) -> Result<Job, AppError>;
}
