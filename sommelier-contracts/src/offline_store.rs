use async_trait::async_trait;
use sommelier_model::WineResult;

#[derive(Debug, thiserror::Error)]
pub enum OfflineStoreError {
    #[error("Offline cache write failed: {0}")]
    Write(String),

    #[error("Offline cache encoding failed: {0}")]
    Encoding(String),
}

/// Previously retrieved wine results, keyed by session.
///
/// Reads have no side effects observable to the controller. Eviction is the
/// store's own business, so `load_cached_results` may come back empty even
/// right after `has_cached_results` said otherwise.
#[async_trait]
pub trait OfflineStore: Send + Sync {
    async fn has_cached_results(&self) -> bool;

    async fn load_cached_results(&self) -> Vec<WineResult>;

    /// Remember the results of a live scan for later offline use.
    async fn cache_results(
        &self,
        wines: &[WineResult],
    ) -> Result<(), OfflineStoreError>;
}
