use crate::shared::error::AppError;
use async_trait::async_trait;

/// Re-reads cached server state so the UI shows truth instead of overlays.
#[async_trait]
pub trait ReadModelRefresher: Send + Sync {
    async fn refresh_all(&self) -> Result<(), AppError>;
}
