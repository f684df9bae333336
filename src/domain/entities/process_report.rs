use super::Job;
use crate::domain::value_objects::JobId;
use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStep {
    ClearAssignment,
    HelperPayment,
    Recurrence,
}

impl EnrichmentStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStep::ClearAssignment => "clear_assignment",
            EnrichmentStep::HelperPayment => "helper_payment",
            EnrichmentStep::Recurrence => "recurrence",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    AssignmentsCleared(u64),
    HelperPaid { amount: f64 },
    /// No commission configured, or the completer is the owner.
    NoHelperPayment,
    NextJobCreated { job_id: JobId, scheduled_date: String },
    NotRecurring,
}

/// Result of one best-effort step that ran after the job was completed.
#[derive(Debug)]
pub struct EnrichmentResult {
    pub step: EnrichmentStep,
    pub outcome: Result<EnrichmentOutcome, AppError>,
}

impl EnrichmentResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug)]
pub struct CompletionReport {
    /// Core effect, already committed when enrichments run.
    pub job: Job,
    pub enrichments: Vec<EnrichmentResult>,
}

impl CompletionReport {
    pub fn enrichment(&self, step: EnrichmentStep) -> Option<&EnrichmentResult> {
        self.enrichments.iter().find(|result| result.step == step)
    }

    pub fn failed_enrichments(&self) -> impl Iterator<Item = &EnrichmentResult> {
        self.enrichments.iter().filter(|result| !result.is_ok())
    }
}

#[derive(Debug)]
pub enum ProcessReport {
    Completed(CompletionReport),
    /// The job already carries this completion; nothing was written.
    AlreadyCompleted { job_id: JobId },
    MarkedPaid { job_ids: Vec<JobId> },
    Rescheduled { job_id: JobId },
    NotesUpdated { job_id: JobId },
}
