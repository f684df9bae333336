pub mod sqlite_remote_store;

pub use sqlite_remote_store::SqliteRemoteStore;
