use crate::types::ResolutionResult;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct CacheEntry {
    result: ResolutionResult,
    stored_at: Instant,
}

/// In-memory result cache with a fixed TTL.
///
/// Stale entries are dropped when they are next looked up; nothing sweeps the map.
pub struct ResultCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, domain: &str) -> Option<ResolutionResult> {
        let stale = match self.entries.get(domain) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => return Some(entry.result.clone()),
            Some(_) => true,
            None => false,
        };

        if stale {
            self.entries
                .remove_if(domain, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        }
        None
    }

    pub fn insert(&self, domain: &str, result: ResolutionResult) {
        self.entries.insert(
            domain.to_string(),
            CacheEntry {
                result,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
