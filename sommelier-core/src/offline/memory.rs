use async_trait::async_trait;
use sommelier_contracts::offline_store::{OfflineStore, OfflineStoreError};
use sommelier_model::WineResult;
use tokio::sync::RwLock;

/// Offline results held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryOfflineStore {
    wines: RwLock<Vec<WineResult>>,
}

impl InMemoryOfflineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(wines: Vec<WineResult>) -> Self {
        Self {
            wines: RwLock::new(wines),
        }
    }

    pub async fn replace(&self, wines: Vec<WineResult>) {
        *self.wines.write().await = wines;
    }

    pub async fn evict(&self) {
        self.wines.write().await.clear();
    }
}

#[async_trait]
impl OfflineStore for InMemoryOfflineStore {
    async fn has_cached_results(&self) -> bool {
        !self.wines.read().await.is_empty()
    }

    async fn load_cached_results(&self) -> Vec<WineResult> {
        self.wines.read().await.clone()
    }

    async fn cache_results(
        &self,
        wines: &[WineResult],
    ) -> Result<(), OfflineStoreError> {
        self.replace(wines.to_vec()).await;
        Ok(())
    }
}
