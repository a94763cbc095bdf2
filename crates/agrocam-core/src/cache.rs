//! Response cache
//!
//! Identical questions (same text, region and language) asked within the TTL
//! get the stored answer instead of a new round of model calls.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time-to-live of a cached answer
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// TTL map keyed by the SHA-256 of the question
pub struct ResponseCache<T> {
    entries: DashMap<String, Entry<T>>,
    ttl: Duration,
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<T: Clone> ResponseCache<T> {
    /// Empty cache
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Hex SHA-256 of `query`, `region` and `language`
    #[must_use]
    pub fn key(query: &str, region: &str, language: &str) -> String {
        let mut hasher = Sha256::new();
        for part in [query.trim().to_lowercase().as_str(), region, language] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Fresh value under `key`; expired entries are dropped
    pub fn get(&self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
            debug!(key = %key, "Cache entry expired");
        }
        None
    }

    /// Store `value`
    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry, returning how many went
    pub fn purge_expired(&self) -> usize {
        // Counted in place: live inserts may land while this runs
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let fresh = entry.stored_at.elapsed() < self.ttl;
            if !fresh {
                removed += 1;
            }
            fresh
        });
        removed
    }

    /// Entries currently held, fresh or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time-to-live
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable_and_normalised() {
        let a = ResponseCache::<String>::key("Prix du cacao ?", "Centre", "fr");
        let b = ResponseCache::<String>::key("  prix du cacao ? ", "Centre", "fr");
        let c = ResponseCache::<String>::key("Prix du cacao ?", "Sud", "fr");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_key_parts_do_not_run_together() {
        let a = ResponseCache::<String>::key("ab", "c", "fr");
        let b = ResponseCache::<String>::key("a", "bc", "fr");
        assert_ne!(a, b);
    }

    #[test]
    fn test_get_returns_fresh_value() {
        let cache = ResponseCache::default();
        cache.insert("k", "réponse".to_string());
        assert_eq!(cache.get("k").as_deref(), Some("réponse"));
        assert_eq!(cache.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("k", 1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = ResponseCache::new(Duration::from_millis(20));
        cache.insert("a", 1);
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.insert("b", 2);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_purge_races_with_inserts() {
        let cache = std::sync::Arc::new(ResponseCache::new(Duration::ZERO));
        for i in 0..50 {
            cache.insert(format!("old{i}"), i);
        }
        let writer = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    cache.insert(format!("new{i}"), i);
                }
            })
        };
        let mut removed = 0;
        for _ in 0..20 {
            removed += cache.purge_expired();
        }
        writer.join().unwrap();
        removed += cache.purge_expired();
        assert_eq!(removed, 550);
        assert!(cache.is_empty());
    }
}
