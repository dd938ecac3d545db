use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// How long a cached home page stays valid without an explicit clear.
pub const INDEX_CACHE_TTL: Duration = Duration::from_secs(20);

/// Process-wide cache for the home feed, managed as Rocket state. Keyed by
/// page number; the value is the fully built template context, so two hits
/// on the same entry render byte-identical pages. Mutations do not touch
/// it: entries go away only through `clear` or expiry.
pub struct PageCache {
    entries: RwLock<HashMap<u64, CacheEntry>>,
    ttl: Duration,
}

struct CacheEntry {
    stored_at: Instant,
    context: Value,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        PageCache {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, page: u64) -> Option<Value> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&page)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.context.clone())
        } else {
            None
        }
    }

    pub fn set(&self, page: u64, context: Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                page,
                CacheEntry {
                    stored_at: Instant::now(),
                    context,
                },
            );
        }
    }

    /// Drops every cached page.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl Default for PageCache {
    fn default() -> Self {
        PageCache::new(INDEX_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_returns_stored_context() {
        let cache = PageCache::default();
        cache.set(1, json!({"page_obj": []}));
        assert_eq!(cache.get(1), Some(json!({"page_obj": []})));
    }

    #[test]
    fn test_miss_on_unknown_page() {
        let cache = PageCache::default();
        cache.set(1, json!({}));
        assert_eq!(cache.get(2), None);
    }

    #[test]
    fn test_clear_empties_the_cache() {
        let cache = PageCache::default();
        cache.set(1, json!({}));
        cache.clear();
        assert_eq!(cache.get(1), None);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = PageCache::new(Duration::from_secs(0));
        cache.set(1, json!({}));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(1), None);
    }
}
