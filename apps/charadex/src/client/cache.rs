//! # Query Cache
//!
//! Results keyed by (query, page) with a staleness window. Identical queries
//! inside the window are answered without a request; a zero TTL disables
//! caching entirely. Every insert prunes whatever has gone stale, so the map
//! only ever holds entries from the last window.

use charadex_core::{CharacterPage, RemoteQuery};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Cache key: one list query at one page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub query: RemoteQuery,
    pub page: u32,
}

#[derive(Debug)]
pub struct QueryCache {
    ttl: Duration,
    entries: Mutex<HashMap<QueryKey, (Instant, CharacterPage)>>,
}

impl QueryCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A fresh cached page, if any. Stale entries are evicted on read.
    pub fn get(&self, key: &QueryKey) -> Option<CharacterPage> {
        if self.ttl.is_zero() {
            return None;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((stored, page)) if stored.elapsed() < self.ttl => Some(page.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: QueryKey, page: CharacterPage) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), page));
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
