use std::collections::HashMap;

use log::debug;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Decides which entries leave the cache after an insert.
pub trait EvictionPolicy: Send + Sync {
    /// `order` lists the cached keys oldest first, `inserted` included.
    /// Returns the keys to drop.
    fn evict(&self, inserted: &str, order: &[String]) -> Vec<String>;
}

/// Keeps everything for the life of the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEviction;

impl EvictionPolicy for NoEviction {
    fn evict(&self, _inserted: &str, _order: &[String]) -> Vec<String> {
        Vec::new()
    }
}

struct Entries<V> {
    values: HashMap<String, V>,
    order: Vec<String>,
}

/// In-memory image cache keyed by URL.
///
/// Lookups and inserts are independent operations: two callers that both
/// miss on the same URL may both download it. [`ImageCache::put`] lets the
/// last write win, [`ImageCache::insert_if_absent`] keeps the first.
pub struct ImageCache<V> {
    entries: RwLock<Entries<V>>,
    policy: Box<dyn EvictionPolicy>,
}

impl<V: Clone> ImageCache<V> {
    pub fn new() -> Self {
        Self::with_policy(NoEviction)
    }

    pub fn with_policy(policy: impl EvictionPolicy + 'static) -> Self {
        ImageCache {
            entries: RwLock::new(Entries {
                values: HashMap::new(),
                order: Vec::new(),
            }),
            policy: Box::new(policy),
        }
    }

    pub async fn get(&self, url: &str) -> Option<V> {
        self.entries.read().await.values.get(url).cloned()
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.entries.read().await.values.contains_key(url)
    }

    pub async fn put(&self, url: impl Into<String>, value: V) {
        let url = url.into();
        let mut entries = self.entries.write().await;
        if entries.values.insert(url.clone(), value).is_none() {
            entries.order.push(url.clone());
        }
        self.apply_policy(&mut entries, &url);
    }

    /// Store `value` unless `url` is already cached; returns what the cache holds.
    pub async fn insert_if_absent(&self, url: impl Into<String>, value: V) -> V {
        let mut entries = self.entries.write().await;
        self.insert_locked(&mut entries, url.into(), value)
    }

    /// Like [`ImageCache::insert_if_absent`], but stores nothing once `token`
    /// is cancelled, including while waiting for the lock.
    pub async fn insert_if_absent_unless_cancelled(
        &self,
        url: impl Into<String>,
        value: V,
        token: &CancellationToken,
    ) -> Option<V> {
        let url = url.into();
        let mut entries = tokio::select! {
            biased;
            () = token.cancelled() => return None,
            entries = self.entries.write() => entries,
        };
        if token.is_cancelled() {
            return None;
        }
        Some(self.insert_locked(&mut entries, url, value))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.values.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn insert_locked(&self, entries: &mut Entries<V>, url: String, value: V) -> V {
        if let Some(existing) = entries.values.get(&url) {
            return existing.clone();
        }
        entries.values.insert(url.clone(), value.clone());
        entries.order.push(url.clone());
        self.apply_policy(entries, &url);
        value
    }

    fn apply_policy(&self, entries: &mut Entries<V>, inserted: &str) {
        let victims = self.policy.evict(inserted, &entries.order);
        if victims.is_empty() {
            return;
        }
        debug!("Evicting {} cached images", victims.len());
        for key in &victims {
            entries.values.remove(key);
        }
        entries.order.retain(|k| !victims.contains(k));
    }
}

impl<V: Clone> Default for ImageCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
