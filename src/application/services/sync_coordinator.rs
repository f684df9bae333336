use super::backpressure::BackpressureMonitor;
use super::connectivity_monitor::ConnectivityMonitor;
use super::processors::MutationProcessor;
use crate::application::ports::{
    HapticPattern, MutationQueue, NotificationKind, Notifier, ReadModelRefresher, SnapshotStore,
};
use crate::domain::entities::{
    MutationPayload, MutationRecord, OptimisticSnapshot, ProcessReport, SkipReason, SyncOutcome,
    SyncReport, UndecodableMutation,
};
use crate::domain::value_objects::{JobId, MutationId};
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use crate::shared::metrics::{SyncMetrics, SyncMetricsSnapshot};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Holds the draining flag for the lifetime of one cycle.
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy)]
enum SnapshotFate {
    Confirm,
    Discard,
}

/// Owns the offline queue lifecycle: durable enqueue with optimistic views,
/// single-flight FIFO replay, bounded retry and the user-facing summary.
pub struct SyncCoordinator {
    queue: Arc<dyn MutationQueue>,
    snapshots: Arc<dyn SnapshotStore>,
    processor: Arc<dyn MutationProcessor>,
    read_models: Arc<dyn ReadModelRefresher>,
    notifier: Arc<dyn Notifier>,
    connectivity: Arc<ConnectivityMonitor>,
    backpressure: BackpressureMonitor,
    metrics: SyncMetrics,
    draining: AtomicBool,
    config: SyncConfig,
}

impl SyncCoordinator {
    pub fn new(
        queue: Arc<dyn MutationQueue>,
        snapshots: Arc<dyn SnapshotStore>,
        processor: Arc<dyn MutationProcessor>,
        read_models: Arc<dyn ReadModelRefresher>,
        notifier: Arc<dyn Notifier>,
        connectivity: Arc<ConnectivityMonitor>,
        config: SyncConfig,
    ) -> Self {
        let backpressure =
            BackpressureMonitor::new(config.backpressure_threshold, Arc::clone(&notifier));
        Self {
            queue,
            snapshots,
            processor,
            read_models,
            notifier,
            connectivity,
            backpressure,
            metrics: SyncMetrics::new(),
            draining: AtomicBool::new(false),
            config,
        }
    }

    /// Durably queues a mutation and records its optimistic view. Fails only
    /// when the payload is invalid or the local queue cannot be written.
    pub async fn enqueue(&self, payload: MutationPayload) -> Result<MutationId, AppError> {
        payload.validate().map_err(AppError::ValidationError)?;

        let id = self.queue.add(&payload).await?;
        info!(mutation_id = %id, kind = %payload.kind(), "mutation queued");

        // The record is already durable; a missing overlay only delays the UI.
        let view = payload.optimistic_view();
        for entity_id in payload.entity_ids() {
            if let Err(e) = self.snapshots.upsert(&entity_id, id, &view).await {
                warn!(
                    mutation_id = %id,
                    job_id = %entity_id,
                    error = %e,
                    "failed to write optimistic snapshot"
                );
            }
        }

        self.observe_backpressure().await;
        Ok(id)
    }

    /// Queues the mutation and, when online, drains straight away so online and
    /// offline actions share one write path.
    pub async fn submit(&self, payload: MutationPayload) -> Result<MutationId, AppError> {
        let id = self.enqueue(payload).await?;

        if self.config.drain_on_enqueue && self.connectivity.is_online() {
            match self.sync_now().await {
                Ok(outcome) => debug!(mutation_id = %id, ?outcome, "drain after submit"),
                Err(e) => warn!(mutation_id = %id, error = %e, "drain after submit failed"),
            }
        }
        Ok(id)
    }

    /// Runs one drain cycle unless one is already running or the device is
    /// offline. A suppressed trigger is dropped, not deferred.
    pub async fn sync_now(&self) -> Result<SyncOutcome, AppError> {
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            debug!("sync already in progress");
            return Ok(SyncOutcome::Skipped(SkipReason::AlreadyDraining));
        };
        if !self.connectivity.is_online() {
            debug!("offline, sync skipped");
            return Ok(SyncOutcome::Skipped(SkipReason::Offline));
        }

        self.metrics.record_cycle();
        let contents = self.queue.load().await?;
        if contents.is_empty() {
            self.backpressure.observe(0, true);
            return Ok(SyncOutcome::Drained(SyncReport::default()));
        }

        info!(count = contents.len(), "draining mutation queue");
        let mut report = SyncReport::default();
        for entry in &contents.undecodable {
            self.reject_undecodable(entry, &mut report).await;
        }
        for record in &contents.records {
            self.replay(record, &mut report).await;
        }

        match self.read_models.refresh_all().await {
            Ok(()) => match self.snapshots.purge_confirmed().await {
                Ok(purged) => debug!(purged, "confirmed snapshots purged"),
                Err(e) => warn!(error = %e, "failed to purge confirmed snapshots"),
            },
            Err(e) => warn!(error = %e, "read model refresh failed"),
        }

        report.pending_count = match self.queue.count().await {
            Ok(depth) => depth,
            Err(e) => {
                warn!(error = %e, "failed to count pending mutations");
                (contents.len() as u32)
                    .saturating_sub(report.synced_count + report.abandoned_count)
            }
        };
        self.backpressure
            .observe(report.pending_count, self.connectivity.is_online());

        self.announce(&report);
        info!(
            synced = report.synced_count,
            retried = report.retried_count,
            abandoned = report.abandoned_count,
            pending = report.pending_count,
            "sync cycle finished"
        );
        Ok(SyncOutcome::Drained(report))
    }

    async fn replay(&self, record: &MutationRecord, report: &mut SyncReport) {
        let kind = record.kind();
        match self.run_processor(record).await {
            Ok(outcome) => {
                match &outcome {
                    ProcessReport::Completed(completion) => {
                        let failed = completion.failed_enrichments().count();
                        if failed > 0 {
                            warn!(
                                mutation_id = %record.id,
                                failed,
                                "completion synced with failed follow-ups"
                            );
                        }
                    }
                    ProcessReport::AlreadyCompleted { job_id } => {
                        info!(
                            mutation_id = %record.id,
                            job_id = %job_id,
                            "completion was already applied"
                        );
                    }
                    _ => {}
                }
                // If this fails the record is replayed next cycle.
                if let Err(e) = self.queue.remove(record.id).await {
                    error!(
                        mutation_id = %record.id,
                        error = %e,
                        "failed to remove synced mutation"
                    );
                }
                self.settle_snapshots(record.id, SnapshotFate::Confirm).await;
                self.metrics.record_success();
                report.synced_count += 1;
                debug!(mutation_id = %record.id, kind = %kind, "mutation synced");
            }
            Err(err) => {
                self.record_failure(record.id, kind.as_str(), &err, report).await;
            }
        }
    }

    /// Runs the processor on its own task so a panic fails only this record.
    async fn run_processor(&self, record: &MutationRecord) -> Result<ProcessReport, AppError> {
        let processor = Arc::clone(&self.processor);
        let payload = record.payload.clone();
        match tokio::spawn(async move { processor.process(&payload).await }).await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => Err(AppError::Internal(format!(
                "processor panicked on mutation {}",
                record.id
            ))),
            Err(join_err) => Err(AppError::Internal(join_err.to_string())),
        }
    }

    async fn reject_undecodable(&self, entry: &UndecodableMutation, report: &mut SyncReport) {
        let err = AppError::DeserializationError(entry.error.clone());
        self.record_failure(entry.id, &entry.kind, &err, report).await;
    }

    /// Counts one failed attempt and abandons the record once its retries are
    /// used up.
    async fn record_failure(
        &self,
        id: MutationId,
        kind: &str,
        err: &AppError,
        report: &mut SyncReport,
    ) {
        let retry_count = match self.queue.increment_retry(id).await {
            Ok(count) => count,
            Err(e) => {
                error!(mutation_id = %id, error = %e, "failed to record retry");
                self.metrics.record_retry();
                report.retried_count += 1;
                return;
            }
        };
        warn!(
            mutation_id = %id,
            kind,
            retry_count,
            transient = err.is_transient(),
            error = %err,
            "mutation replay failed"
        );

        if retry_count >= self.config.max_retries {
            if let Err(e) = self.queue.remove(id).await {
                error!(mutation_id = %id, error = %e, "failed to drop abandoned mutation");
            }
            self.settle_snapshots(id, SnapshotFate::Discard).await;
            self.metrics.record_abandoned();
            report.abandoned_count += 1;
            error!(mutation_id = %id, kind, retry_count, "mutation abandoned");
        } else {
            self.metrics.record_retry();
            report.retried_count += 1;
        }
    }

    async fn settle_snapshots(&self, id: MutationId, fate: SnapshotFate) {
        let result = match fate {
            SnapshotFate::Confirm => self.snapshots.confirm_mutation(id).await,
            SnapshotFate::Discard => self.snapshots.discard_mutation(id).await,
        };
        match result {
            Ok(layers) => debug!(mutation_id = %id, ?fate, layers, "snapshot layers settled"),
            Err(e) => {
                warn!(mutation_id = %id, ?fate, error = %e, "snapshot update failed")
            }
        }
    }

    fn announce(&self, report: &SyncReport) {
        if report.synced_count > 0 {
            self.notifier.notify(
                NotificationKind::Success,
                &format!("Synced {} offline change(s)", report.synced_count),
            );
            self.notifier.haptic(HapticPattern::Success);
        }
        if report.abandoned_count > 0 {
            self.notifier.notify(
                NotificationKind::Warning,
                &format!(
                    "{} change(s) could not be synced and were discarded",
                    report.abandoned_count
                ),
            );
            self.notifier.haptic(HapticPattern::Warning);
        }
    }

    async fn observe_backpressure(&self) {
        match self.queue.count().await {
            Ok(depth) => {
                self.backpressure.observe(depth, self.connectivity.is_online());
            }
            Err(e) => warn!(error = %e, "failed to read queue depth"),
        }
    }

    pub async fn pending_count(&self) -> Result<u32, AppError> {
        self.queue.count().await
    }

    pub async fn pending_mutations(&self) -> Result<Vec<MutationRecord>, AppError> {
        self.queue.get_all().await
    }

    pub async fn optimistic_snapshot(
        &self,
        job_id: &JobId,
    ) -> Result<Option<OptimisticSnapshot>, AppError> {
        self.snapshots.get(job_id).await
    }

    pub async fn optimistic_snapshots(&self) -> Result<Vec<OptimisticSnapshot>, AppError> {
        self.snapshots.list().await
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.connectivity
    }

    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }
}
