use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::info;

/// Best-effort view of the platform's network signal. Never errors; a false
/// "online" only means the next replay fails and is retried.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online_tx: watch::Sender<bool>,
    reconnected: AtomicBool,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (online_tx, _) = watch::channel(initially_online);
        Self {
            online_tx,
            reconnected: AtomicBool::new(false),
        }
    }

    /// Feeds the platform signal. Only a real offline to online transition
    /// raises the reconnect edge.
    pub fn set_online(&self, online: bool) {
        let was_online = self.online_tx.send_replace(online);
        match (was_online, online) {
            (false, true) => {
                self.reconnected.store(true, Ordering::Release);
                info!("connectivity restored");
            }
            (true, false) => info!("connectivity lost"),
            _ => {}
        }
    }

    pub fn is_online(&self) -> bool {
        *self.online_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online_tx.subscribe()
    }

    pub fn was_offline_now_online(&self) -> bool {
        self.reconnected.load(Ordering::Acquire)
    }

    pub fn acknowledge_reconnect(&self) {
        self.reconnected.store(false, Ordering::Release);
    }

    /// Reads and acknowledges the reconnect edge in one step, so at most one
    /// caller ever observes a given transition.
    pub fn take_reconnect(&self) -> bool {
        self.reconnected.swap(false, Ordering::AcqRel)
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
