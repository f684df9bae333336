use crate::application::ports::{HapticPattern, NotificationKind, Notifier};
use tracing::{info, warn};

/// Headless notifier that only logs; used by the ops binary and daemons.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => info!(target: "fieldsync::notify", "{message}"),
            NotificationKind::Warning => warn!(target: "fieldsync::notify", "{message}"),
        }
    }

    fn haptic(&self, pattern: HapticPattern) {
        tracing::debug!(target: "fieldsync::notify", ?pattern, "haptic cue");
    }
}
