use feed::history::{HistoryStore, MAX_SEARCH_HISTORY};
use feed::{KvStore, MemoryStore, SearchHistory};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

proptest! {
    #[test]
    fn bounded_unique_most_recent_first(queries in prop::collection::vec("[a-e]{1,2}", 0..80)) {
        let store = Arc::new(MemoryStore::new());
        let mut h = SearchHistory::searches(store.clone());
        h.load();
        for q in &queries {
            let before = h.len();
            let existed = h.entries().contains(q);
            h.add_query(q);
            prop_assert_eq!(&h.entries()[0], q);
            if existed {
                prop_assert_eq!(h.len(), before);
            }
        }

        prop_assert!(h.len() <= MAX_SEARCH_HISTORY);
        let unique: HashSet<&String> = h.entries().iter().collect();
        prop_assert_eq!(unique.len(), h.len());

        // order matches the last occurrence of each query, newest first
        let mut expected: Vec<String> = Vec::new();
        for q in queries.iter().rev() {
            if !expected.contains(q) { expected.push(q.clone()); }
        }
        expected.truncate(MAX_SEARCH_HISTORY);
        prop_assert_eq!(h.entries(), expected.as_slice());

        // what was saved is what a fresh store loads
        let mut reopened = SearchHistory::searches(store);
        reopened.load();
        prop_assert_eq!(reopened.entries(), h.entries());
    }

    #[test]
    fn any_bound_is_respected(bound in 1usize..8, ids in prop::collection::vec(0u8..20, 0..50)) {
        let storage: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let mut h: HistoryStore<String> = HistoryStore::new(storage, "prop-history", bound);
        h.load();
        for id in ids {
            h.add(id.to_string());
            prop_assert!(h.len() <= bound);
        }
    }
}
