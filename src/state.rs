use crate::application::ports::Notifier;
use crate::application::services::{
    ConnectivityMonitor, JobMutationProcessor, SyncCoordinator,
};
use crate::domain::entities::SyncOutcome;
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::notifications::{ReadModelBroadcaster, TracingNotifier};
use crate::infrastructure::offline::{SqliteMutationQueue, SqliteSnapshotStore};
use crate::infrastructure::remote::SqliteRemoteStore;
use crate::shared::config::AppConfig;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const READ_MODEL_CHANNEL_CAPACITY: usize = 64;

/// Long-lived service graph. Clone freely; every member is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub local_pool: ConnectionPool,
    pub remote_pool: ConnectionPool,
    pub remote_store: Arc<SqliteRemoteStore>,
    pub read_models: Arc<ReadModelBroadcaster>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub coordinator: Arc<SyncCoordinator>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        Self::with_notifier(config, Arc::new(TracingNotifier)).await
    }

    /// Connectivity starts offline; the first online signal from the platform
    /// is the edge that drains whatever an earlier session left queued.
    pub async fn with_notifier(
        config: AppConfig,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

        ensure_sqlite_parent_dir(&config.database.url)?;
        ensure_sqlite_parent_dir(&config.remote.url)?;

        let local_pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections)
                .await
                .with_context(|| format!("failed to open local store {}", config.database.url))?;
        local_pool
            .migrate_local()
            .await
            .context("failed to migrate local store")?;

        let remote_pool = ConnectionPool::new(&config.remote.url, config.remote.max_connections)
            .await
            .with_context(|| format!("failed to open remote store {}", config.remote.url))?;
        remote_pool
            .migrate_remote()
            .await
            .context("failed to migrate remote store")?;

        let remote_store = Arc::new(SqliteRemoteStore::new(remote_pool.get_pool().clone()));
        let read_models = Arc::new(ReadModelBroadcaster::new(READ_MODEL_CHANNEL_CAPACITY));
        let connectivity = Arc::new(ConnectivityMonitor::new(false));

        let coordinator = Arc::new(SyncCoordinator::new(
            Arc::new(SqliteMutationQueue::new(local_pool.get_pool().clone())),
            Arc::new(SqliteSnapshotStore::new(local_pool.get_pool().clone())),
            Arc::new(JobMutationProcessor::new(remote_store.clone())),
            read_models.clone(),
            notifier,
            connectivity.clone(),
            config.sync.clone(),
        ));

        info!(
            database = %config.database.url,
            remote = %config.remote.url,
            "fieldsync state initialized"
        );

        Ok(Self {
            config,
            local_pool,
            remote_pool,
            remote_store,
            read_models,
            connectivity,
            coordinator,
        })
    }

    /// Drains once per offline to online edge. Returns `None` when automatic
    /// sync on reconnect is disabled.
    pub fn spawn_reconnect_listener(&self) -> Option<JoinHandle<()>> {
        if !self.config.sync.auto_sync_on_reconnect {
            return None;
        }

        let connectivity = Arc::clone(&self.connectivity);
        let coordinator = Arc::clone(&self.coordinator);
        let mut online_rx = connectivity.subscribe();

        Some(tokio::spawn(async move {
            loop {
                if connectivity.is_online() && connectivity.take_reconnect() {
                    match coordinator.sync_now().await {
                        Ok(SyncOutcome::Drained(report)) => {
                            info!(synced = report.synced_count, "reconnect sync finished")
                        }
                        Ok(SyncOutcome::Skipped(reason)) => {
                            info!(?reason, "reconnect sync skipped")
                        }
                        Err(e) => warn!(error = %e, "reconnect sync failed"),
                    }
                }
                if online_rx.changed().await.is_err() {
                    break;
                }
            }
        }))
    }

    pub async fn close(&self) {
        self.local_pool.close().await;
        self.remote_pool.close().await;
    }
}

/// File-backed SQLite urls need their directory to exist before connecting.
fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
