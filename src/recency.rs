use crate::error::StoreError;
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Default cap on the number of remembered ids.
pub const DEFAULT_RECENT_LIMIT: usize = 4;

/// Durable key-value home of the recency list.
pub trait RecencyStore {
    fn load(&self) -> Result<Vec<String>, StoreError>;
    fn save(&self, ids: &[String]) -> Result<(), StoreError>;
}

/// In-process store. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    ids: Rc<RefCell<Vec<String>>>,
}

impl MemoryStore {
    #[cfg(test)]
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Rc::new(RefCell::new(ids.into_iter().map(Into::into).collect())),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.ids.borrow().clone()
    }
}

impl RecencyStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, ids: &[String]) -> Result<(), StoreError> {
        *self.ids.borrow_mut() = ids.to_vec();
        Ok(())
    }
}

/// An id is usable when it has visible content and no control characters.
pub fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.chars().any(char::is_control)
}

/// Drops unparseable ids and later duplicates, keeping order.
fn sanitize(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|id| {
            if !is_valid_id(id) {
                debug!("Recency: dropping malformed id {:?}", id);
                return false;
            }
            seen.insert(id.clone())
        })
        .collect()
}

/// Bounded most-recent-first list of launched ids.
pub struct RecencyTracker {
    ids: Vec<String>,
    limit: usize,
    store: Box<dyn RecencyStore>,
}

impl RecencyTracker {
    /// Loads the stored list. Store failures start from an empty list.
    pub fn new(store: Box<dyn RecencyStore>, limit: usize) -> Self {
        let raw = store.load().unwrap_or_else(|e| {
            warn!("Recency: could not load history: {}", e);
            Vec::new()
        });

        let mut ids = sanitize(raw);
        ids.truncate(limit);
        debug!("Recency: loaded {} ids", ids.len());

        Self { ids, limit, store }
    }

    /// Moves `id` to the front, evicts past the limit and saves.
    pub fn record_use(&mut self, id: &str) {
        if !is_valid_id(id) {
            warn!("Recency: ignoring malformed id {:?}", id);
            return;
        }

        self.ids.retain(|existing| existing != id);
        self.ids.insert(0, id.to_string());
        self.ids.truncate(self.limit);

        if let Err(e) = self.store.save(&self.ids) {
            warn!("Recency: could not save history: {}", e);
        }
    }

    pub fn current_list(&self) -> Vec<String> {
        sanitize(self.ids.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    fn tracker(store: &MemoryStore, limit: usize) -> RecencyTracker {
        RecencyTracker::new(Box::new(store.clone()), limit)
    }

    #[test]
    fn test_move_to_front_without_duplicates() {
        let store = MemoryStore::default();
        let mut recents = tracker(&store, DEFAULT_RECENT_LIMIT);
        recents.record_use("a");
        recents.record_use("b");
        recents.record_use("a");

        assert_eq!(recents.current_list(), vec!["a", "b"]);
        assert_eq!(store.snapshot(), vec!["a", "b"]);
    }

    #[test]
    fn test_recording_front_id_is_stable() {
        let store = MemoryStore::with_ids(["a", "b"]);
        let mut recents = tracker(&store, DEFAULT_RECENT_LIMIT);
        recents.record_use("a");
        assert_eq!(recents.current_list(), vec!["a", "b"]);
    }

    #[test]
    fn test_evicts_oldest_past_limit() {
        let store = MemoryStore::default();
        let mut recents = tracker(&store, 4);
        for id in ["1", "2", "3", "4", "5", "6"] {
            recents.record_use(id);
        }
        assert_eq!(recents.current_list(), vec!["6", "5", "4", "3"]);
        assert_eq!(store.snapshot(), vec!["6", "5", "4", "3"]);
    }

    #[test]
    fn test_load_drops_duplicates_and_malformed() {
        let store = MemoryStore::with_ids(["a", "", "b", "a", "bad\nid", "  ", "c"]);
        let recents = tracker(&store, 10);
        assert_eq!(recents.current_list(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_truncates_to_limit() {
        let store = MemoryStore::with_ids(["a", "b", "c", "d", "e"]);
        let recents = tracker(&store, 2);
        assert_eq!(recents.current_list(), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_record_is_ignored() {
        let store = MemoryStore::with_ids(["a"]);
        let mut recents = tracker(&store, 4);
        recents.record_use("");
        assert_eq!(recents.current_list(), vec!["a"]);
    }

    struct BrokenStore;

    impl RecencyStore for BrokenStore {
        fn load(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Io {
                path: PathBuf::from("/nowhere"),
                source: io::Error::other("boom"),
            })
        }

        fn save(&self, _ids: &[String]) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: PathBuf::from("/nowhere"),
                source: io::Error::other("boom"),
            })
        }
    }

    #[test]
    fn test_store_failures_are_not_fatal() {
        let mut recents = RecencyTracker::new(Box::new(BrokenStore), 4);
        assert!(recents.current_list().is_empty());
        recents.record_use("a");
        assert_eq!(recents.current_list(), vec!["a"]);
    }
}
