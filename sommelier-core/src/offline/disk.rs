use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use sommelier_contracts::offline_store::{OfflineStore, OfflineStoreError};
use sommelier_model::WineResult;
use tracing::{debug, warn};

use super::TARGET;
use crate::config::OfflineCacheConfig;

/// Stable key for one session's cached result list.
///
/// Versioned so a change of the encoded layout can live next to old entries.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OfflineCacheKey(String);

impl OfflineCacheKey {
    pub fn for_session(session: &str) -> Self {
        Self(format!("offline/v1/session/{}", session.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OfflineCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OfflineCacheKey").field(&self.0).finish()
    }
}

impl fmt::Display for OfflineCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wine results persisted with `cacache` (index + content-addressed blobs).
///
/// Reads never fail from the controller's point of view: an unreadable or
/// corrupt entry is logged and treated as an empty cache.
#[derive(Clone, Debug)]
pub struct DiskOfflineStore {
    root: PathBuf,
    key: OfflineCacheKey,
}

impl DiskOfflineStore {
    pub fn new(root: PathBuf, key: OfflineCacheKey) -> Self {
        Self { root, key }
    }

    pub fn from_config(config: &OfflineCacheConfig) -> Self {
        Self::new(
            config.dir.clone(),
            OfflineCacheKey::for_session(&config.session_key),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key(&self) -> &OfflineCacheKey {
        &self.key
    }

    /// Drop the cached entry for this session.
    pub async fn evict(&self) -> Result<(), OfflineStoreError> {
        cacache::index::RemoveOpts::new()
            .remove_fully(true)
            .remove(self.root.as_path(), self.key.as_str())
            .await
            .map_err(|e| {
                OfflineStoreError::Write(format!("cacache remove failed: {e}"))
            })
    }

    async fn read(&self) -> Option<Vec<u8>> {
        match cacache::read(self.root.as_path(), self.key.as_str()).await {
            Ok(bytes) => Some(bytes),
            Err(cacache::Error::EntryNotFound(_, _)) => {
                debug!(target: TARGET, key = %self.key, "no cached results");
                None
            }
            Err(err) => {
                warn!(target: TARGET, key = %self.key, error = %err, "offline cache read failed");
                None
            }
        }
    }
}

#[async_trait]
impl OfflineStore for DiskOfflineStore {
    async fn has_cached_results(&self) -> bool {
        match cacache::metadata(self.root.as_path(), self.key.as_str()).await
        {
            Ok(meta) => meta.is_some_and(|meta| meta.size > 0),
            Err(err) => {
                warn!(target: TARGET, key = %self.key, error = %err, "offline cache metadata lookup failed");
                false
            }
        }
    }

    async fn load_cached_results(&self) -> Vec<WineResult> {
        let Some(bytes) = self.read().await else {
            return Vec::new();
        };

        match serde_json::from_slice::<Vec<WineResult>>(&bytes) {
            Ok(wines) => wines,
            Err(err) => {
                warn!(target: TARGET, key = %self.key, error = %err, "cached results are not decodable");
                Vec::new()
            }
        }
    }

    async fn cache_results(
        &self,
        wines: &[WineResult],
    ) -> Result<(), OfflineStoreError> {
        let bytes = serde_json::to_vec(wines)
            .map_err(|e| OfflineStoreError::Encoding(e.to_string()))?;

        cacache::write(self.root.as_path(), self.key.as_str(), &bytes)
            .await
            .map_err(|e| {
                OfflineStoreError::Write(format!("cacache write failed: {e}"))
            })?;

        debug!(target: TARGET, key = %self.key, count = wines.len(), bytes = bytes.len(), "cached scan results");
        Ok(())
    }
}
