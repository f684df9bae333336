use crate::application::ports::{HapticPattern, Notification, NotificationKind, Notifier};
use tokio::sync::mpsc;

/// Forwards notifications to the UI layer over an unbounded channel so the
/// coordinator never waits on rendering.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification dropped: receiver closed");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.send(Notification::Message {
            kind,
            text: message.to_string(),
        });
    }

    fn haptic(&self, pattern: HapticPattern) {
        self.send(Notification::Haptic(pattern));
    }
}
