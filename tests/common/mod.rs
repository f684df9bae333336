#![allow(dead_code)]

use async_trait::async_trait;
use fieldsync_lib::application::ports::{Notification, NotificationKind, RemoteStore};
use fieldsync_lib::application::services::{
    ConnectivityMonitor, JobMutationProcessor, MutationProcessor, SyncCoordinator,
};
use fieldsync_lib::domain::entities::{
    CompleteJob, CustomerSnapshot, Job, MutationPayload, NewJob, ProcessReport,
};
use fieldsync_lib::domain::value_objects::{CustomerId, JobId, UserId};
use fieldsync_lib::infrastructure::database::ConnectionPool;
use fieldsync_lib::infrastructure::notifications::{ChannelNotifier, ReadModelBroadcaster};
use fieldsync_lib::infrastructure::offline::{SqliteMutationQueue, SqliteSnapshotStore};
use fieldsync_lib::infrastructure::remote::SqliteRemoteStore;
use fieldsync_lib::shared::AppError;
use fieldsync_lib::shared::config::SyncConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub const OWNER: &str = "owner-1";
pub const HELPER: &str = "helper-1";
pub const CUSTOMER: &str = "cust-1";

/// Wraps the real processor and records the order in which payloads arrive.
pub struct RecordingProcessor {
    inner: JobMutationProcessor,
    calls: Arc<Mutex<Vec<MutationPayload>>>,
    delay: Option<Duration>,
}

#[async_trait]
impl MutationProcessor for RecordingProcessor {
    async fn process(&self, payload: &MutationPayload) -> Result<ProcessReport, AppError> {
        self.calls.lock().expect("calls lock").push(payload.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.process(payload).await
    }
}

pub struct SyncTestContext {
    pub coordinator: Arc<SyncCoordinator>,
    pub remote: Arc<SqliteRemoteStore>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub notifications: UnboundedReceiver<Notification>,
    pub calls: Arc<Mutex<Vec<MutationPayload>>>,
}

impl SyncTestContext {
    pub fn calls(&self) -> Vec<MutationPayload> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            out.push(notification);
        }
        out
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        self.take_notifications()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::Message {
                    kind: NotificationKind::Warning,
                    text,
                } => Some(text),
                _ => None,
            })
            .collect()
    }
}

pub async fn setup_sync_context(online: bool) -> SyncTestContext {
    build_context(online, None).await
}

pub async fn setup_slow_sync_context(delay: Duration) -> SyncTestContext {
    build_context(true, Some(delay)).await
}

async fn build_context(online: bool, delay: Option<Duration>) -> SyncTestContext {
    let local = ConnectionPool::from_memory().await.expect("local pool");
    local.migrate_local().await.expect("local migrations");
    let remote_pool = ConnectionPool::from_memory().await.expect("remote pool");
    remote_pool.migrate_remote().await.expect("remote migrations");

    let remote = Arc::new(SqliteRemoteStore::new(remote_pool.get_pool().clone()));
    let calls = Arc::new(Mutex::new(Vec::new()));
    let processor = RecordingProcessor {
        inner: JobMutationProcessor::new(remote.clone()),
        calls: calls.clone(),
        delay,
    };
    let (notifier, notifications) = ChannelNotifier::new();
    let connectivity = Arc::new(ConnectivityMonitor::new(online));

    let coordinator = Arc::new(SyncCoordinator::new(
        Arc::new(SqliteMutationQueue::new(local.get_pool().clone())),
        Arc::new(SqliteSnapshotStore::new(local.get_pool().clone())),
        Arc::new(processor),
        Arc::new(ReadModelBroadcaster::new(8)),
        Arc::new(notifier),
        connectivity.clone(),
        SyncConfig::default(),
    ));

    SyncTestContext {
        coordinator,
        remote,
        connectivity,
        notifications,
        calls,
    }
}

pub fn job_id(raw: &str) -> JobId {
    JobId::new(raw.to_string()).expect("job id")
}

pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw.to_string()).expect("user id")
}

pub fn customer_id() -> CustomerId {
    CustomerId::new(CUSTOMER.to_string()).expect("customer id")
}

pub async fn seed_job(remote: &SqliteRemoteStore, id: &str, scheduled_date: &str) -> Job {
    remote
        .insert_job(&NewJob {
            id: job_id(id),
            owner_id: user_id(OWNER),
            customer_id: customer_id(),
            scheduled_date: scheduled_date.to_string(),
            price: 25.0,
        })
        .await
        .expect("seed job")
}

pub fn complete_job_payload(
    id: &str,
    custom_amount: Option<f64>,
    frequency_weeks: Option<u32>,
    completed_by: Option<&str>,
) -> MutationPayload {
    MutationPayload::CompleteJob(CompleteJob {
        job_id: job_id(id),
        custom_amount,
        photo_url: None,
        completed_by: completed_by.map(user_id),
        customer: CustomerSnapshot {
            customer_id: customer_id(),
            owner_id: user_id(OWNER),
            price: 25.0,
            frequency_weeks,
            gocardless_customer_id: None,
            gocardless_mandate_status: None,
        },
    })
}
