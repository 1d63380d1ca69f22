//! Recent-search history.
//!
//! A small, user-facing list of the queries that actually produced results:
//! capped to the 5 most recent, deduplicated by exact text, and expiring as
//! a whole 7 days after the last save (the TTL rides on the stored entry,
//! so expiry is checked lazily by the store on read).

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;

use crate::storage::{PersistentStore, keys};

/// Maximum number of remembered queries.
pub const HISTORY_CAP: usize = 5;
/// Lifetime of the history list, refreshed on every save.
pub const HISTORY_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

fn history_capacity() -> NonZeroUsize {
    NonZeroUsize::new(HISTORY_CAP).unwrap_or(NonZeroUsize::MIN)
}

/// Stored history, most recent first. Absent, expired, or malformed data
/// reads as empty.
pub fn recent_searches(store: &PersistentStore) -> Vec<String> {
    store.get(keys::RECENT_SEARCHES).unwrap_or_default()
}

/// Record `query` at the front of the history, deduplicating by exact text
/// and evicting the oldest entry past capacity. Blank queries are ignored.
pub fn save_recent_search(store: &PersistentStore, query: &str) {
    let query = query.trim();
    if query.is_empty() {
        return;
    }
    let mut cache: LruCache<String, ()> = LruCache::new(history_capacity());
    // Replay stored history oldest-first so the stored order becomes the
    // cache's recency order.
    for prior in recent_searches(store).into_iter().rev() {
        cache.put(prior, ());
    }
    cache.put(query.to_owned(), ());
    let values: Vec<String> = cache.iter().map(|(q, ())| q.clone()).collect();
    if let Err(e) = store.set(keys::RECENT_SEARCHES, &values, Some(HISTORY_TTL)) {
        tracing::warn!(error = %e, "recent searches not persisted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn store() -> PersistentStore {
        PersistentStore::new(Box::new(MemoryBackend::new()))
    }

    #[test]
    fn newest_query_sits_at_the_front() {
        let store = store();
        save_recent_search(&store, "alien");
        save_recent_search(&store, "blade runner");
        assert_eq!(
            recent_searches(&store),
            vec!["blade runner".to_string(), "alien".to_string()]
        );
    }

    #[test]
    fn repeat_of_existing_query_moves_to_front_without_duplicate() {
        let store = store();
        save_recent_search(&store, "alien");
        save_recent_search(&store, "blade runner");
        save_recent_search(&store, "alien");
        assert_eq!(
            recent_searches(&store),
            vec!["alien".to_string(), "blade runner".to_string()]
        );
    }

    #[test]
    fn capacity_evicts_the_oldest_entry() {
        let store = store();
        for q in ["one", "two", "three", "four", "five", "six"] {
            save_recent_search(&store, q);
        }
        let history = recent_searches(&store);
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.first().map(String::as_str), Some("six"));
        assert!(!history.iter().any(|q| q == "one"));
    }

    #[test]
    fn blank_queries_are_ignored() {
        let store = store();
        save_recent_search(&store, "   ");
        assert!(recent_searches(&store).is_empty());
    }

    #[test]
    fn history_expires_seven_days_after_last_save() {
        let store = store();
        save_recent_search(&store, "alien");
        let week_ms = HISTORY_TTL.as_millis() as i64;
        let now = crate::util::now_millis();
        let before: Option<Vec<String>> = store.get_at(keys::RECENT_SEARCHES, now + week_ms - 10_000);
        assert!(before.is_some());
        let after: Option<Vec<String>> = store.get_at(keys::RECENT_SEARCHES, now + week_ms + 1_000);
        assert!(after.is_none());
    }
}
