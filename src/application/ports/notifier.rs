use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticPattern {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    Message { kind: NotificationKind, text: String },
    Haptic(HapticPattern),
}

/// User-facing side channel. Implementations must not block the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
    fn haptic(&self, pattern: HapticPattern);
}
