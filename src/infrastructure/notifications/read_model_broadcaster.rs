use crate::application::ports::ReadModelRefresher;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadModelEvent {
    /// Every cached query should be re-fetched from the remote store.
    Invalidated,
}

/// Tells subscribed caches to re-read server state after a drain.
#[derive(Debug, Clone)]
pub struct ReadModelBroadcaster {
    tx: broadcast::Sender<ReadModelEvent>,
}

impl ReadModelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReadModelEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl ReadModelRefresher for ReadModelBroadcaster {
    async fn refresh_all(&self) -> Result<(), AppError> {
        // No subscribers simply means nothing is cached yet.
        let receivers = self.tx.send(ReadModelEvent::Invalidated).unwrap_or(0);
        tracing::debug!(receivers, "read models invalidated");
        Ok(())
    }
}
