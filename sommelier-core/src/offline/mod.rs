//! Offline store adapters.
//!
//! Both adapters implement [`OfflineStore`](sommelier_contracts::offline_store::OfflineStore):
//! an in-memory list for tests and demos, and a persistent `cacache` store
//! keyed by session.

#[cfg(feature = "disk-cache")]
pub mod disk;
pub mod memory;

#[cfg(feature = "disk-cache")]
pub use disk::{DiskOfflineStore, OfflineCacheKey};
pub use memory::InMemoryOfflineStore;

pub(crate) const TARGET: &str = "scan::offline";
