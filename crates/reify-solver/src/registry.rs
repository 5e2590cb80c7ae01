//! Key-indexed registry for consumers (binding containers, serializer
//! caches).
//!
//! Keys are immutable and hash from a precomputed value, so they can be
//! shared freely across threads. The registry adds the usual concurrent-map
//! guarantees on top: population of an entry happens under the shard lock,
//! so at most one initializer runs per Key and readers never observe a
//! half-built value.

use crate::error::Result;
use crate::hierarchy::TypeHierarchy;
use crate::key::Key;
use crate::ordering::KeyOrdering;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct KeyRegistry<V> {
    entries: DashMap<Key, Arc<V>>,
}

impl<V> Default for KeyRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyRegistry<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert or replace; the last writer wins. Returns the previous value.
    pub fn register(&self, key: Key, value: V) -> Option<Arc<V>> {
        trace!(key = %key, "KeyRegistry::register");
        self.entries.insert(key, Arc::new(value))
    }

    pub fn get(&self, key: &Key) -> Option<Arc<V>> {
        self.entries.get(key).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Existing value for `key`, or the one `init` builds. `init` runs at
    /// most once per Key even under contention, and must not touch this
    /// registry.
    pub fn get_or_insert_with(&self, key: Key, init: impl FnOnce() -> V) -> Arc<V> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                debug!(key = %entry.key(), "KeyRegistry: populating entry");
                let value = Arc::new(init());
                entry.insert(Arc::clone(&value));
                value
            }
        }
    }

    /// Fallible [`get_or_insert_with`](Self::get_or_insert_with). A failed
    /// initializer leaves no entry behind.
    pub fn get_or_try_insert_with(
        &self,
        key: Key,
        init: impl FnOnce() -> Result<V>,
    ) -> Result<Arc<V>> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                debug!(key = %entry.key(), "KeyRegistry: populating entry");
                let value = Arc::new(init()?);
                entry.insert(Arc::clone(&value));
                Ok(value)
            }
        }
    }

    /// The entry for `required` itself, or else the most derived registered
    /// Key whose values may be used where `required` is expected.
    pub fn resolve(
        &self,
        env: &dyn TypeHierarchy,
        required: &Key,
    ) -> Result<Option<(Key, Arc<V>)>> {
        if let Some(value) = self.get(required) {
            return Ok(Some((required.clone(), value)));
        }
        // Snapshot first: assignability checks must not run under shard locks.
        let snapshot: Vec<(Key, Arc<V>)> = self
            .entries
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        let mut candidates = Vec::new();
        for (key, value) in snapshot {
            if required.is_assignable_from(env, &key)? {
                candidates.push((key, value));
            }
        }
        let ordering = KeyOrdering::new(env);
        let Some(best) = ordering.most_specific(candidates.iter().map(|(k, _)| k))? else {
            trace!(required = %required, "KeyRegistry::resolve: no candidate");
            return Ok(None);
        };
        let best = best.clone();
        Ok(candidates.into_iter().find(|(k, _)| *k == best))
    }

    pub fn remove(&self, key: &Key) -> Option<Arc<V>> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    /// Registered Keys in canonical text order.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.entries.iter().map(|r| r.key().clone()).collect();
        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
