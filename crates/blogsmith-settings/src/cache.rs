//! Read-through cache keyed by tuples of strings
//!
//! Values are kept as JSON and decoded into the caller's type on every hit;
//! the type acts as the schema. An entry that no longer decodes is evicted
//! and recomputed.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SettingsResult;

pub type CacheKey = Vec<String>;

pub const DEFAULT_CAPACITY: usize = 64;

pub struct SettingsCache {
    cache: Mutex<LruCache<CacheKey, Value>>,
}

impl SettingsCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached value for `key`, computing and storing it on a miss
    pub fn get<T, F>(&self, key: &[&str], compute: F) -> SettingsResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> SettingsResult<T>,
    {
        let key = cache_key(key);
        let cached = self.cache.lock().get(&key).cloned();
        if let Some(value) = cached {
            match serde_json::from_value(value) {
                Ok(hit) => {
                    log::debug!("Settings cache hit: {key:?}");
                    return Ok(hit);
                }
                Err(e) => {
                    log::warn!("Evicting invalid settings cache entry {key:?}: {e}");
                    self.cache.lock().pop(&key);
                }
            }
        }

        let computed = compute()?;
        let encoded = serde_json::to_value(&computed)?;
        self.cache.lock().put(key, encoded);
        Ok(computed)
    }

    /// Store a raw value, bypassing the schema
    pub fn insert(&self, key: &[&str], value: Value) {
        self.cache.lock().put(cache_key(key), value);
    }

    /// Invalidate several keys at once
    pub fn delete(&self, keys: &[&[&str]]) {
        let mut cache = self.cache.lock();
        for key in keys {
            cache.pop(&cache_key(key));
        }
    }

    pub fn contains(&self, key: &[&str]) -> bool {
        self.cache.lock().contains(&cache_key(key))
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn cache_key(key: &[&str]) -> CacheKey {
    key.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_read_through() {
        let cache = SettingsCache::default();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(true)
        };

        assert!(cache.get(&["isEmailConfigured"], compute).unwrap());
        assert!(cache.get(&["isEmailConfigured"], compute).unwrap());
        assert_eq!(calls.get(), 1);
        assert!(cache.contains(&["isEmailConfigured"]));
    }

    #[test]
    fn test_invalid_entry_is_recomputed() {
        let cache = SettingsCache::default();
        cache.insert(&["count"], json!("not a number"));

        let value: u32 = cache.get(&["count"], || Ok(7)).unwrap();
        assert_eq!(value, 7);

        let again: u32 = cache.get(&["count"], || Ok(8)).unwrap();
        assert_eq!(again, 7);
    }

    #[test]
    fn test_compute_error_is_not_cached() {
        let cache = SettingsCache::default();
        let result: SettingsResult<u32> = cache.get(&["k"], || {
            Err(crate::SettingsError::Validation("boom".into()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_many_and_capacity() {
        let cache = SettingsCache::new(2);
        cache.insert(&["a"], json!(1));
        cache.insert(&["b", "x"], json!(2));
        cache.insert(&["c"], json!(3));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&["a"]));

        cache.delete(&[&["b", "x"], &["c"], &["missing"]]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_falls_back() {
        let cache = SettingsCache::new(0);
        cache.insert(&["a"], json!(1));
        assert_eq!(cache.len(), 1);
    }
}
