pub mod job;
pub mod mutation_payload;
pub mod mutation_record;
pub mod optimistic_snapshot;
pub mod process_report;
pub mod sync_report;

pub use job::{Job, JobCompletion, NewJob};
pub use mutation_payload::{
    BatchMarkPaid, CompleteJob, CustomerSnapshot, MarkJobPaid, MoveJob, MutationPayload,
    UpdateJobNotes,
};
pub use mutation_record::{MutationRecord, QueueContents, UndecodableMutation};
pub use optimistic_snapshot::OptimisticSnapshot;
pub use process_report::{
    CompletionReport, EnrichmentOutcome, EnrichmentResult, EnrichmentStep, ProcessReport,
};
pub use sync_report::{SkipReason, SyncOutcome, SyncReport};
