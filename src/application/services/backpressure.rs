use crate::application::ports::{NotificationKind, Notifier};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Warns once when the queue grows past the threshold and stays quiet until
/// the depth has dropped back below it.
pub struct BackpressureMonitor {
    threshold: u32,
    armed: AtomicBool,
    notifier: Arc<dyn Notifier>,
}

impl BackpressureMonitor {
    pub fn new(threshold: u32, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            threshold,
            armed: AtomicBool::new(true),
            notifier,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns whether a warning was emitted for this observation.
    pub fn observe(&self, depth: u32, online: bool) -> bool {
        if depth < self.threshold {
            self.armed.store(true, Ordering::Release);
            return false;
        }
        if !self.armed.swap(false, Ordering::AcqRel) {
            return false;
        }

        warn!(depth, threshold = self.threshold, online, "mutation queue backlog");
        let message = if online {
            format!("{depth} changes are waiting to sync. Keep the app open until they finish.")
        } else {
            format!("{depth} changes are queued offline. They will sync when you reconnect.")
        };
        self.notifier.notify(NotificationKind::Warning, &message);
        true
    }
}
