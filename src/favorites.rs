//! The user-curated favorites ledger.
//!
//! Sits on top of [`PersistentStore`] under a single fixed key and enforces
//! two invariants: entries are unique by movie id, and insertion order is
//! the display order (no re-sort, ever). Toggling is the only mutation; a
//! toggled-off entry loses its `added_at` for good, which is expected.
//! Every mutation persists the full collection before returning and emits a
//! notification on the bus.

use crate::notify::NotificationBus;
use crate::state::{FavoriteEntry, MovieSummary, Severity};
use crate::storage::{PersistentStore, keys};
use crate::util::now_millis;

/// Ordered, id-unique collection of the user's favorite movies.
#[derive(Debug, Default)]
pub struct FavoritesManager {
    entries: Vec<FavoriteEntry>,
}

impl FavoritesManager {
    /// Load the persisted ledger. Absent or malformed data starts empty;
    /// no error reaches the caller.
    pub fn load(store: &PersistentStore) -> Self {
        let entries: Vec<FavoriteEntry> = store.get(keys::FAVORITES).unwrap_or_default();
        tracing::debug!(count = entries.len(), "favorites loaded");
        Self { entries }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    /// Membership test. Linear scan; the ledger is human-curated and small.
    pub fn is_favorite(&self, id: u64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Add `movie` to the ledger, or remove it if already present.
    /// Returns `true` when the movie is a favorite after the call.
    pub fn toggle(
        &mut self,
        store: &PersistentStore,
        bus: &mut NotificationBus,
        movie: &MovieSummary,
    ) -> bool {
        let now_favorite = if self.is_favorite(movie.id) {
            self.entries.retain(|e| e.id != movie.id);
            bus.notify(
                format!("{} removed from favorites", movie.title),
                Severity::Info,
            );
            false
        } else {
            self.entries
                .push(FavoriteEntry::from_summary(movie, now_millis()));
            bus.notify(
                format!("{} added to favorites!", movie.title),
                Severity::Success,
            );
            true
        };
        self.persist(store);
        now_favorite
    }

    /// Empty the ledger.
    pub fn clear(&mut self, store: &PersistentStore, bus: &mut NotificationBus) {
        self.entries.clear();
        self.persist(store);
        bus.notify("All favorites cleared", Severity::Warning);
    }

    /// Write the full collection through the store. A rejected write keeps
    /// the in-memory ledger authoritative for the rest of the session.
    fn persist(&self, store: &PersistentStore) {
        if let Err(e) = store.set(keys::FAVORITES, &self.entries, None) {
            tracing::warn!(error = %e, "favorites not persisted; continuing in memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_owned(),
            overview: String::new(),
            poster_path: Some(format!("/poster{id}.jpg")),
            release_date: Some("2010-07-16".to_owned()),
            vote_average: 8.4,
            genre_ids: vec![28, 878],
        }
    }

    fn store() -> PersistentStore {
        PersistentStore::new(Box::new(MemoryBackend::new()))
    }

    #[test]
    fn membership_follows_toggle_parity() {
        let store = store();
        let mut bus = NotificationBus::new();
        let mut favs = FavoritesManager::load(&store);
        let m = movie(27205, "Inception");
        for round in 1..=5 {
            favs.toggle(&store, &mut bus, &m);
            assert_eq!(favs.is_favorite(m.id), round % 2 == 1);
        }
    }

    #[test]
    fn toggle_never_duplicates_and_preserves_insertion_order() {
        let store = store();
        let mut bus = NotificationBus::new();
        let mut favs = FavoritesManager::load(&store);
        let a = movie(1, "A");
        let b = movie(2, "B");
        let c = movie(3, "C");
        favs.toggle(&store, &mut bus, &a);
        favs.toggle(&store, &mut bus, &b);
        favs.toggle(&store, &mut bus, &c);
        // Re-toggling B removes it; A and C keep their relative order.
        favs.toggle(&store, &mut bus, &b);
        favs.toggle(&store, &mut bus, &b);
        let ids: Vec<u64> = favs.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        let unique: std::collections::HashSet<u64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn every_mutation_persists_before_returning() {
        let store = store();
        let mut bus = NotificationBus::new();
        let mut favs = FavoritesManager::load(&store);
        favs.toggle(&store, &mut bus, &movie(603, "The Matrix"));
        let persisted: Vec<FavoriteEntry> = store.get(keys::FAVORITES).expect("persisted");
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].title, "The Matrix");

        // A fresh manager sees exactly what was persisted.
        let reloaded = FavoritesManager::load(&store);
        assert!(reloaded.is_favorite(603));
    }

    #[test]
    fn toggle_emits_the_expected_notifications() {
        let store = store();
        let mut bus = NotificationBus::new();
        let mut favs = FavoritesManager::load(&store);
        let m = movie(155, "The Dark Knight");

        favs.toggle(&store, &mut bus, &m);
        let n = bus.current().expect("notification");
        assert_eq!(n.message, "The Dark Knight added to favorites!");
        assert_eq!(n.severity, Severity::Success);

        favs.toggle(&store, &mut bus, &m);
        let n = bus.current().expect("notification");
        assert_eq!(n.message, "The Dark Knight removed from favorites");
        assert_eq!(n.severity, Severity::Info);

        favs.clear(&store, &mut bus);
        let n = bus.current().expect("notification");
        assert_eq!(n.message, "All favorites cleared");
        assert_eq!(n.severity, Severity::Warning);
    }

    #[test]
    fn clear_empties_ledger_and_persists_empty_collection() {
        let store = store();
        let mut bus = NotificationBus::new();
        let mut favs = FavoritesManager::load(&store);
        favs.toggle(&store, &mut bus, &movie(1, "A"));
        favs.toggle(&store, &mut bus, &movie(2, "B"));
        favs.clear(&store, &mut bus);
        assert!(favs.entries().is_empty());
        let persisted: Vec<FavoriteEntry> = store.get(keys::FAVORITES).expect("persisted");
        assert!(persisted.is_empty());
    }

    #[test]
    fn malformed_persisted_ledger_loads_empty() {
        let backend = MemoryBackend::new();
        use crate::storage::StorageBackend;
        backend.store(keys::FAVORITES, "][").expect("raw store");
        let store = PersistentStore::new(Box::new(backend));
        let favs = FavoritesManager::load(&store);
        assert!(favs.entries().is_empty());
    }

    #[test]
    fn rejected_write_degrades_to_in_memory() {
        // Zero-capacity backend rejects every write.
        let store = PersistentStore::new(Box::new(MemoryBackend::with_capacity(0)));
        let mut bus = NotificationBus::new();
        let mut favs = FavoritesManager::load(&store);
        favs.toggle(&store, &mut bus, &movie(1, "A"));
        assert!(favs.is_favorite(1));
        assert!(store.get::<Vec<FavoriteEntry>>(keys::FAVORITES).is_none());
    }
}
