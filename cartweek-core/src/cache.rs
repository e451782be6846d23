//! Read-through cache for parsed tables

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

/// Keeps the result of the first successful load for each key.
///
/// Failed loads are not cached, so a later call retries.
pub struct ReadThroughCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash + Clone, V> ReadThroughCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, or run `load` and cache its result
    pub fn get_or_try_load<E>(
        &self,
        key: &K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(value) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(Arc::clone(value));
        }

        // Two callers may load the same key concurrently; the first insert wins
        let value = Arc::new(load()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key.clone()).or_insert(value)))
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<K: Eq + Hash + Clone, V> Default for ReadThroughCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
