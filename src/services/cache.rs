use std::time::Duration;

use moka::future::Cache;

/// String-keyed store where every entry lives for the same fixed time.
/// Expired entries read as absent and are evicted by moka's housekeeping.
pub struct TtlCache<V> {
    store: Cache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.store.get(key).await
    }

    pub async fn set(&self, key: &str, value: V) {
        self.store.insert(key.to_string(), value).await;
    }

    pub async fn expire(&self, key: &str) -> bool {
        self.store.remove(key).await.is_some()
    }

    pub fn time_to_live(&self) -> Option<Duration> {
        self.store.policy().time_to_live()
    }

    /// Entries currently held, after pending evictions have run.
    pub async fn stored(&self) -> u64 {
        self.store.run_pending_tasks().await;
        self.store.entry_count()
    }
}
