pub mod mutation_queue;
pub mod notifier;
pub mod read_model;
pub mod remote_store;
pub mod snapshot_store;

pub use mutation_queue::MutationQueue;
pub use notifier::{HapticPattern, Notification, NotificationKind, Notifier};
pub use read_model::ReadModelRefresher;
pub use remote_store::RemoteStore;
pub use snapshot_store::SnapshotStore;
