use crate::application::ports::RemoteStore;
use crate::domain::entities::{MoveJob, UpdateJobNotes};
use crate::domain::value_objects::JobId;
use crate::shared::error::AppError;

/// Reschedule and skip differ only in intent; both overwrite the date.
pub async fn move_job(store: &dyn RemoteStore, payload: &MoveJob) -> Result<JobId, AppError> {
    if store
        .set_scheduled_date(&payload.job_id, payload.new_date.trim())
        .await?
    {
        Ok(payload.job_id.clone())
    } else {
        Err(AppError::not_found(format!("job {}", payload.job_id)))
    }
}

pub async fn update_notes(
    store: &dyn RemoteStore,
    payload: &UpdateJobNotes,
) -> Result<JobId, AppError> {
    if store
        .set_notes(&payload.job_id, payload.notes.as_deref())
        .await?
    {
        Ok(payload.job_id.clone())
    } else {
        Err(AppError::not_found(format!("job {}", payload.job_id)))
    }
}
