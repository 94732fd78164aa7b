//! Bounded, content-addressed memo cache shared across requests.
//!
//! Keys are derived from content (text digests, chunk-id signatures), so an
//! entry never goes stale and there is no TTL. Values are immutable once
//! inserted and handed out as `Arc`s.

use moka::sync::Cache;
use std::hash::Hash;
use std::sync::Arc;

/// Default maximum number of cached entries.
pub const DEFAULT_CACHE_CAPACITY: u64 = 512;

/// Thread-safe memo cache keyed by a content-derived key.
pub struct ContentCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    entries: Cache<K, Arc<V>>,
}

impl<K, V> ContentCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key)
    }

    /// Store `value` under `key` and return the shared handle.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.insert(key, Arc::clone(&value));
        value
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
}

impl<K, V> Clone for ContentCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K, V> Default for ContentCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_get_shares_value() {
        let cache: ContentCache<String, Vec<u32>> = ContentCache::new(8);
        let stored = cache.insert("a".to_string(), vec![1, 2, 3]);
        let fetched = cache.get(&"a".to_string()).unwrap();

        assert!(Arc::ptr_eq(&stored, &fetched));
        assert!(cache.contains(&"a".to_string()));
        assert!(cache.get(&"b".to_string()).is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let cache: ContentCache<u64, String> = ContentCache::default();
        let other = cache.clone();
        cache.insert(7, "seven".to_string());

        assert_eq!(other.get(&7).as_deref().map(String::as_str), Some("seven"));
    }
}
