pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{Notification, NotificationKind, Notifier};
pub use application::services::{ConnectivityMonitor, SyncCoordinator};
pub use domain::entities::{MutationPayload, MutationRecord, SyncOutcome, SyncReport};
pub use shared::{AppConfig, AppError, Result};
pub use state::AppState;

/// Installs the global subscriber. `RUST_LOG` overrides the default filter;
/// a second call is a no-op.
pub fn init_logging(json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fieldsync=debug,info".into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .try_init();

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}
