mod mappers;
mod rows;
pub mod sqlite_queue;
pub mod sqlite_snapshot_store;

pub use sqlite_queue::SqliteMutationQueue;
pub use sqlite_snapshot_store::SqliteSnapshotStore;
