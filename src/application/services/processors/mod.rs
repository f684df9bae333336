pub mod complete_job;
pub mod job_fields;
pub mod payments;

use crate::application::ports::RemoteStore;
use crate::domain::entities::{MutationPayload, ProcessReport};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub use complete_job::{helper_payment_amount, next_occurrence, parse_schedule_date};

/// Replays one queued mutation against the remote store. An `Err` leaves the
/// record queued for retry; conditional misses surface as `Conflict`.
#[async_trait]
pub trait MutationProcessor: Send + Sync {
    async fn process(&self, payload: &MutationPayload) -> Result<ProcessReport, AppError>;
}

pub struct JobMutationProcessor {
    remote: Arc<dyn RemoteStore>,
}

impl JobMutationProcessor {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl MutationProcessor for JobMutationProcessor {
    async fn process(&self, payload: &MutationPayload) -> Result<ProcessReport, AppError> {
        let remote = self.remote.as_ref();
        match payload {
            MutationPayload::CompleteJob(p) => {
                complete_job::complete_job(remote, p, Utc::now()).await
            }
            MutationPayload::MarkJobPaid(p) => {
                payments::mark_paid(remote, std::slice::from_ref(&p.job_id), &p.method, Utc::now())
                    .await
                    .map(|job_ids| ProcessReport::MarkedPaid { job_ids })
            }
            MutationPayload::BatchMarkPaid(p) => {
                payments::mark_paid(remote, &p.job_ids, &p.method, Utc::now())
                    .await
                    .map(|job_ids| ProcessReport::MarkedPaid { job_ids })
            }
            MutationPayload::RescheduleJob(p) | MutationPayload::SkipJob(p) => {
                job_fields::move_job(remote, p)
                    .await
                    .map(|job_id| ProcessReport::Rescheduled { job_id })
            }
            MutationPayload::UpdateJobNotes(p) => job_fields::update_notes(remote, p)
                .await
                .map(|job_id| ProcessReport::NotesUpdated { job_id }),
        }
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use crate::domain::entities::{Job, JobCompletion, NewJob};
    use crate::domain::value_objects::{
        CustomerId, JobId, JobStatus, PaymentMethod, PaymentStatus, UserId,
    };
    use chrono::DateTime;
    use mockall::mock;

    mock! {
        pub Remote {}

        #[async_trait]
        impl RemoteStore for Remote {
            async fn fetch_job(&self, job_id: &JobId) -> Result<Option<Job>, AppError>;
            async fn complete_pending_job(
                &self,
                job_id: &JobId,
                completion: &JobCompletion,
            ) -> Result<Option<Job>, AppError>;
            async fn mark_unpaid_jobs_paid(
                &self,
                job_ids: &[JobId],
                method: &PaymentMethod,
                paid_at: DateTime<Utc>,
            ) -> Result<Vec<JobId>, AppError>;
            async fn set_scheduled_date(
                &self,
                job_id: &JobId,
                date: &str,
            ) -> Result<bool, AppError>;
            async fn set_notes<'s, 'b, 'a>(
                &'s self,
                job_id: &'b JobId,
                notes: Option<&'a str>,
            ) -> Result<bool, AppError>;
            async fn delete_task_assignments(&self, job_id: &JobId) -> Result<u64, AppError>;
            async fn commission_percent(
                &self,
                owner_id: &UserId,
                helper_id: &UserId,
            ) -> Result<Option<f64>, AppError>;
            async fn record_helper_payment(
                &self,
                job_id: &JobId,
                helper_id: &UserId,
                amount: f64,
            ) -> Result<bool, AppError>;
            async fn insert_job(&self, job: &NewJob) -> Result<Job, AppError>;
        }
    }

    pub fn sample_job(id: &str, status: JobStatus) -> Job {
        Job {
            id: JobId::new(id.into()).unwrap(),
            owner_id: UserId::new("owner".into()).unwrap(),
            customer_id: CustomerId::new("C1".into()).unwrap(),
            scheduled_date: "2025-01-06".into(),
            status,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            price: 25.0,
            amount_collected: None,
            completed_at: None,
            completed_by: None,
            paid_at: None,
            photo_url: None,
            notes: None,
            helper_id: None,
            helper_payment: None,
        }
    }
}
