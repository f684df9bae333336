mod common;

use common::{complete_job_payload, job_id, seed_job};
use fieldsync_lib::application::ports::RemoteStore;
use fieldsync_lib::domain::value_objects::JobStatus;
use fieldsync_lib::{AppConfig, AppState};
use std::path::Path;
use std::time::Duration;

fn file_config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite:{}?mode=rwc", dir.join("local/queue.db").display());
    config.remote.url = format!("sqlite:{}?mode=rwc", dir.join("remote/jobs.db").display());
    config.database.max_connections = 2;
    config.remote.max_connections = 2;
    config
}

#[tokio::test]
async fn queued_mutations_survive_restart() {
    let dir = tempfile::tempdir().expect("tempdir");

    let state = AppState::new(file_config(dir.path())).await.expect("state");
    seed_job(&state.remote_store, "J1", "2025-01-06").await;
    let id = state
        .coordinator
        .enqueue(complete_job_payload("J1", Some(30.0), None, None))
        .await
        .unwrap();
    state.close().await;
    drop(state);

    let reopened = AppState::new(file_config(dir.path())).await.expect("reopened state");
    let records = reopened.coordinator.pending_mutations().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].retry_count, 0);
    assert!(
        reopened
            .coordinator
            .optimistic_snapshot(&job_id("J1"))
            .await
            .unwrap()
            .is_some()
    );
    reopened.close().await;
}

#[tokio::test]
async fn reconnect_edge_drains_queue_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::new(file_config(dir.path())).await.expect("state");
    seed_job(&state.remote_store, "J1", "2025-01-06").await;
    state
        .coordinator
        .enqueue(complete_job_payload("J1", None, None, None))
        .await
        .unwrap();

    let listener = state.spawn_reconnect_listener().expect("listener enabled");
    state.connectivity.set_online(true);

    let mut drained = false;
    for _ in 0..200 {
        if state.coordinator.pending_count().await.unwrap() == 0 {
            drained = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(drained, "reconnect should trigger a drain");
    assert!(!state.connectivity.was_offline_now_online());
    assert_eq!(state.coordinator.metrics().cycles, 1);

    let job = state.remote_store.fetch_job(&job_id("J1")).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);

    listener.abort();
    state.close().await;
}

#[tokio::test]
async fn reconnect_listener_respects_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = file_config(dir.path());
    config.sync.auto_sync_on_reconnect = false;

    let state = AppState::new(config).await.expect("state");
    assert!(state.spawn_reconnect_listener().is_none());
    state.close().await;
}
