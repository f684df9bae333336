pub mod backpressure;
pub mod connectivity_monitor;
pub mod processors;
pub mod sync_coordinator;

pub use backpressure::BackpressureMonitor;
pub use connectivity_monitor::ConnectivityMonitor;
pub use processors::{JobMutationProcessor, MutationProcessor};
pub use sync_coordinator::SyncCoordinator;
