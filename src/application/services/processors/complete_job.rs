use crate::application::ports::RemoteStore;
use crate::domain::entities::{
    CompleteJob, CompletionReport, EnrichmentOutcome, EnrichmentResult, EnrichmentStep, Job,
    JobCompletion, NewJob, ProcessReport,
};
use crate::domain::value_objects::{JobId, JobStatus, PaymentMethod, PaymentStatus};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Rounds to two decimal places, half away from zero.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn helper_payment_amount(collected: f64, commission_percent: f64) -> f64 {
    round_currency(collected * commission_percent / 100.0)
}

/// Accepts `YYYY-MM-DD`, RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS` values.
pub fn parse_schedule_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Unparseable dates restart the cycle from today. `None` when the result
/// falls outside the representable calendar.
pub fn next_occurrence(scheduled_date: &str, weeks: u32, now: DateTime<Utc>) -> Option<NaiveDate> {
    let base = parse_schedule_date(scheduled_date).unwrap_or_else(|| now.date_naive());
    TimeDelta::try_weeks(i64::from(weeks)).and_then(|delta| base.checked_add_signed(delta))
}

/// True when the job already carries exactly this payload's completion, i.e.
/// an earlier replay of the same mutation committed before it was dequeued.
fn completed_by_payload(job: &Job, payload: &CompleteJob) -> bool {
    job.status == JobStatus::Completed
        && job.amount_collected == Some(payload.collected_amount())
        && job.completed_by == payload.completed_by
        && job.photo_url == payload.photo_url
}

/// Completes the job, then runs the best-effort follow-ups in order. Only the
/// completion itself can fail the mutation.
pub async fn complete_job(
    store: &dyn RemoteStore,
    payload: &CompleteJob,
    now: DateTime<Utc>,
) -> Result<ProcessReport, AppError> {
    let payment_status = payload.payment_status();
    let completion = JobCompletion {
        payment_method: (payment_status == PaymentStatus::Processing)
            .then_some(PaymentMethod::DirectDebit),
        payment_status,
        amount_collected: payload.collected_amount(),
        completed_at: now,
        completed_by: payload.completed_by.clone(),
        photo_url: payload.photo_url.clone(),
    };

    let job = match store
        .complete_pending_job(&payload.job_id, &completion)
        .await?
    {
        Some(job) => job,
        None => return explain_completion_miss(store, payload).await,
    };

    let enrichments = vec![
        EnrichmentResult {
            step: EnrichmentStep::ClearAssignment,
            outcome: store
                .delete_task_assignments(&job.id)
                .await
                .map(EnrichmentOutcome::AssignmentsCleared),
        },
        EnrichmentResult {
            step: EnrichmentStep::HelperPayment,
            outcome: settle_helper_payment(store, payload, &job).await,
        },
        EnrichmentResult {
            step: EnrichmentStep::Recurrence,
            outcome: schedule_next_occurrence(store, payload, &job, now).await,
        },
    ];

    let report = CompletionReport { job, enrichments };
    for failed in report.failed_enrichments() {
        if let Err(err) = &failed.outcome {
            warn!(
                job_id = %report.job.id,
                step = failed.step.as_str(),
                error = %err,
                "job completed but follow-up step failed"
            );
        }
    }
    Ok(ProcessReport::Completed(report))
}

async fn explain_completion_miss(
    store: &dyn RemoteStore,
    payload: &CompleteJob,
) -> Result<ProcessReport, AppError> {
    let job_id = &payload.job_id;
    match store.fetch_job(job_id).await? {
        Some(job) if completed_by_payload(&job, payload) => {
            debug!(job_id = %job_id, "completion already applied");
            Ok(ProcessReport::AlreadyCompleted { job_id: job.id })
        }
        Some(job) => Err(AppError::conflict(format!(
            "job {job_id} is {}, expected pending",
            job.status.as_str()
        ))),
        None => Err(AppError::not_found(format!("job {job_id}"))),
    }
}

async fn settle_helper_payment(
    store: &dyn RemoteStore,
    payload: &CompleteJob,
    job: &Job,
) -> Result<EnrichmentOutcome, AppError> {
    let Some(helper) = payload.helper() else {
        return Ok(EnrichmentOutcome::NoHelperPayment);
    };

    let Some(percent) = store
        .commission_percent(&payload.customer.owner_id, helper)
        .await?
    else {
        debug!(job_id = %job.id, helper = %helper, "no commission configured");
        return Ok(EnrichmentOutcome::NoHelperPayment);
    };

    let collected = job.amount_collected.unwrap_or_else(|| payload.collected_amount());
    let amount = helper_payment_amount(collected, percent);
    if store.record_helper_payment(&job.id, helper, amount).await? {
        Ok(EnrichmentOutcome::HelperPaid { amount })
    } else {
        debug!(job_id = %job.id, "helper payment already recorded");
        Ok(EnrichmentOutcome::NoHelperPayment)
    }
}

async fn schedule_next_occurrence(
    store: &dyn RemoteStore,
    payload: &CompleteJob,
    job: &Job,
    now: DateTime<Utc>,
) -> Result<EnrichmentOutcome, AppError> {
    let Some(weeks) = payload.customer.recurrence_weeks() else {
        return Ok(EnrichmentOutcome::NotRecurring);
    };

    let next_date = next_occurrence(&job.scheduled_date, weeks, now)
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "{weeks} week(s) after {} is out of calendar range",
                job.scheduled_date
            ))
        })?
        .format("%Y-%m-%d")
        .to_string();
    let next = NewJob {
        id: JobId::new(Uuid::new_v4().to_string()).map_err(AppError::Internal)?,
        owner_id: job.owner_id.clone(),
        customer_id: job.customer_id.clone(),
        scheduled_date: next_date,
        price: payload.customer.price,
    };

    let created = store.insert_job(&next).await?;
    debug!(
        job_id = %job.id,
        next_job_id = %created.id,
        date = %created.scheduled_date,
        "recurrence advanced"
    );
    Ok(EnrichmentOutcome::NextJobCreated {
        job_id: created.id,
        scheduled_date: created.scheduled_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::processors::mocks::{MockRemote, sample_job};
    use crate::domain::entities::CustomerSnapshot;
    use crate::domain::value_objects::{CustomerId, JobStatus, UserId};
    use mockall::predicate::*;

    fn payload(frequency_weeks: Option<u32>, completed_by: Option<&str>) -> CompleteJob {
        CompleteJob {
            job_id: JobId::new("J1".into()).unwrap(),
            custom_amount: Some(30.0),
            photo_url: None,
            completed_by: completed_by.map(|id| UserId::new(id.into()).unwrap()),
            customer: CustomerSnapshot {
                customer_id: CustomerId::new("C1".into()).unwrap(),
                owner_id: UserId::new("owner".into()).unwrap(),
                price: 25.0,
                frequency_weeks,
                gocardless_customer_id: None,
                gocardless_mandate_status: None,
            },
        }
    }

    fn completed_job() -> Job {
        let mut job = sample_job("J1", JobStatus::Completed);
        job.amount_collected = Some(30.0);
        job
    }

    async fn run(remote: &MockRemote, payload: &CompleteJob) -> CompletionReport {
        match complete_job(remote, payload, Utc::now()).await.unwrap() {
            ProcessReport::Completed(report) => report,
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn rounds_helper_payment_to_cents() {
        assert_eq!(helper_payment_amount(30.0, 33.0), 9.9);
        assert_eq!(helper_payment_amount(19.99, 12.5), 2.5);
        assert_eq!(helper_payment_amount(25.0, 0.0), 0.0);
    }

    #[test]
    fn next_occurrence_adds_whole_weeks() {
        let now = Utc::now();
        assert_eq!(
            next_occurrence("2025-01-06", 4, now),
            NaiveDate::from_ymd_opt(2025, 2, 3)
        );
        assert_eq!(
            next_occurrence("2025-01-06T09:30:00Z", 1, now),
            NaiveDate::from_ymd_opt(2025, 1, 13)
        );
    }

    #[test]
    fn next_occurrence_out_of_range_is_none() {
        let now = Utc::now();
        assert_eq!(next_occurrence("2025-01-06", 20_000_000, now), None);
        assert_eq!(next_occurrence("2025-01-06", u32::MAX, now), None);
        let last = NaiveDate::MAX.format("%Y-%m-%d").to_string();
        assert_eq!(next_occurrence(&last, 1, now), None);
    }

    #[test]
    fn unparseable_date_falls_back_to_today() {
        let now = Utc::now();
        assert_eq!(
            next_occurrence("next tuesday", 2, now),
            Some(now.date_naive() + TimeDelta::weeks(2))
        );
    }

    #[tokio::test]
    async fn commission_lookup_failure_does_not_fail_completion() {
        let mut remote = MockRemote::new();
        remote
            .expect_complete_pending_job()
            .times(1)
            .returning(|_, _| Ok(Some(completed_job())));
        remote
            .expect_delete_task_assignments()
            .times(1)
            .returning(|_| Ok(1));
        remote
            .expect_commission_percent()
            .times(1)
            .returning(|_, _| Err(AppError::Network("timeout".into())));
        remote.expect_record_helper_payment().never();
        remote.expect_insert_job().never();

        let report = run(&remote, &payload(None, Some("helper"))).await;

        assert_eq!(report.job.status, JobStatus::Completed);
        let helper = report.enrichment(EnrichmentStep::HelperPayment).unwrap();
        assert!(matches!(helper.outcome, Err(AppError::Network(_))));
        assert!(matches!(
            report.enrichment(EnrichmentStep::Recurrence).unwrap().outcome,
            Ok(EnrichmentOutcome::NotRecurring)
        ));
    }

    #[tokio::test]
    async fn helper_payment_uses_configured_commission() {
        let mut remote = MockRemote::new();
        remote
            .expect_complete_pending_job()
            .returning(|_, _| Ok(Some(completed_job())));
        remote.expect_delete_task_assignments().returning(|_| Ok(0));
        remote
            .expect_commission_percent()
            .returning(|_, _| Ok(Some(40.0)));
        remote
            .expect_record_helper_payment()
            .with(always(), always(), eq(12.0))
            .times(1)
            .returning(|_, _, _| Ok(true));

        let report = run(&remote, &payload(None, Some("helper"))).await;

        assert!(matches!(
            report.enrichment(EnrichmentStep::HelperPayment).unwrap().outcome,
            Ok(EnrichmentOutcome::HelperPaid { amount }) if amount == 12.0
        ));
    }

    #[tokio::test]
    async fn recurrence_failure_leaves_job_completed() {
        let mut remote = MockRemote::new();
        remote
            .expect_complete_pending_job()
            .returning(|_, _| Ok(Some(completed_job())));
        remote.expect_delete_task_assignments().returning(|_| Ok(0));
        remote
            .expect_insert_job()
            .times(1)
            .returning(|_| Err(AppError::Database("constraint".into())));

        let report = run(&remote, &payload(Some(4), None)).await;

        assert_eq!(report.failed_enrichments().count(), 1);
        assert_eq!(
            report.failed_enrichments().next().unwrap().step,
            EnrichmentStep::Recurrence
        );
    }

    #[tokio::test]
    async fn huge_recurrence_interval_fails_only_the_recurrence_step() {
        let mut remote = MockRemote::new();
        remote
            .expect_complete_pending_job()
            .times(1)
            .returning(|_, _| Ok(Some(completed_job())));
        remote.expect_delete_task_assignments().returning(|_| Ok(0));
        remote.expect_insert_job().never();

        let report = run(&remote, &payload(Some(20_000_000), None)).await;

        assert_eq!(report.job.status, JobStatus::Completed);
        let recurrence = report.enrichment(EnrichmentStep::Recurrence).unwrap();
        assert!(matches!(recurrence.outcome, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn replay_of_an_applied_completion_reports_already_completed() {
        let mut remote = MockRemote::new();
        remote
            .expect_complete_pending_job()
            .returning(|_, _| Ok(None));
        remote
            .expect_fetch_job()
            .returning(|_| Ok(Some(completed_job())));
        remote.expect_delete_task_assignments().never();
        remote.expect_insert_job().never();

        let report = complete_job(&remote, &payload(Some(4), None), Utc::now())
            .await
            .unwrap();

        assert!(matches!(
            report,
            ProcessReport::AlreadyCompleted { ref job_id } if job_id.as_str() == "J1"
        ));
    }

    #[tokio::test]
    async fn already_completed_job_is_a_conflict_without_side_effects() {
        let mut remote = MockRemote::new();
        remote
            .expect_complete_pending_job()
            .returning(|_, _| Ok(None));
        remote
            .expect_fetch_job()
            .returning(|_| Ok(Some(completed_job())));
        remote.expect_delete_task_assignments().never();
        remote.expect_commission_percent().never();
        remote.expect_insert_job().never();

        let err = complete_job(&remote, &payload(Some(4), Some("helper")), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let mut remote = MockRemote::new();
        remote
            .expect_complete_pending_job()
            .returning(|_, _| Ok(None));
        remote.expect_fetch_job().returning(|_| Ok(None));

        let err = complete_job(&remote, &payload(None, None), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
