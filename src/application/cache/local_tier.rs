use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

struct LocalEntry<V> {
    value: Arc<V>,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

impl<V> LocalEntry<V> {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        match age.to_std() {
            Ok(age) => age < self.ttl,
            // Clock went backwards: treat as just written.
            Err(_) => true,
        }
    }
}

/// Outcome of an in-process lookup
#[derive(Debug, PartialEq, Eq)]
pub enum LocalLookup<V> {
    Fresh(Arc<V>),
    Expired,
    Missing,
}

/// In-process cache tier, shared by every request of one process.
///
/// Expiry is lazy: stale entries stay in the map, are reported as expired on
/// read and get overwritten by the next `insert` for the same key.
pub struct LocalTier<V> {
    entries: RwLock<HashMap<String, LocalEntry<V>>>,
}

impl<V> std::fmt::Debug for LocalTier<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTier")
            .field("entries", &"<RwLock>")
            .finish()
    }
}

impl<V> LocalTier<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str, now: DateTime<Utc>) -> LocalLookup<V> {
        let guard = match self.entries.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.get(key) {
            Some(entry) if entry.is_fresh(now) => LocalLookup::Fresh(entry.value.clone()),
            Some(_) => LocalLookup::Expired,
            None => LocalLookup::Missing,
        }
    }

    pub fn insert(&self, key: String, value: Arc<V>, now: DateTime<Utc>, ttl: Duration) {
        let entry = LocalEntry {
            value,
            created_at: now,
            ttl,
        };

        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(key, entry);
            }
            Err(poisoned) => {
                tracing::error!("LocalTier: Lock poisoned during write, recovering");
                poisoned.into_inner().insert(key, entry);
            }
        }
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for LocalTier<V> {
    fn default() -> Self {
        Self::new()
    }
}
