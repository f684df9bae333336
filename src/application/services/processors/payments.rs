use crate::application::ports::RemoteStore;
use crate::domain::value_objects::{JobId, PaymentMethod};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Marks the still-unpaid jobs among `job_ids` as paid. Partial batches are
/// fine; a batch that touched nothing is a conflict.
pub async fn mark_paid(
    store: &dyn RemoteStore,
    job_ids: &[JobId],
    method: &PaymentMethod,
    paid_at: DateTime<Utc>,
) -> Result<Vec<JobId>, AppError> {
    if job_ids.is_empty() {
        return Err(AppError::ValidationError(
            "Batch mark-paid needs at least one job".to_string(),
        ));
    }

    let updated = store.mark_unpaid_jobs_paid(job_ids, method, paid_at).await?;
    if updated.is_empty() {
        return Err(AppError::conflict(format!(
            "none of {} job(s) were unpaid",
            job_ids.len()
        )));
    }

    if updated.len() < job_ids.len() {
        debug!(
            requested = job_ids.len(),
            updated = updated.len(),
            "some jobs were already paid"
        );
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::processors::mocks::MockRemote;

    fn ids(raw: &[&str]) -> Vec<JobId> {
        raw.iter().map(|id| JobId::new((*id).into()).unwrap()).collect()
    }

    #[tokio::test]
    async fn partial_batch_reports_only_updated_jobs() {
        let mut remote = MockRemote::new();
        remote
            .expect_mark_unpaid_jobs_paid()
            .withf(|job_ids, method, _| {
                job_ids.len() == 3 && *method == PaymentMethod::BankTransfer
            })
            .times(1)
            .returning(|_, _, _| Ok(ids(&["J1", "J3"])));

        let method = PaymentMethod::BankTransfer;
        let updated = mark_paid(&remote, &ids(&["J1", "J2", "J3"]), &method, Utc::now())
            .await
            .unwrap();

        assert_eq!(updated, ids(&["J1", "J3"]));
    }

    #[tokio::test]
    async fn empty_input_never_reaches_the_store() {
        let mut remote = MockRemote::new();
        remote.expect_mark_unpaid_jobs_paid().never();

        let err = mark_paid(&remote, &[], &PaymentMethod::Cash, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
