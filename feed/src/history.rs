//! Bounded, most-recent-first histories persisted to the local key/value store.

use crate::error::FeedResult;
use crate::store::KvStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SEARCH_HISTORY_KEY: &str = "book-discovery-search-history";
pub const MAX_SEARCH_HISTORY: usize = 20;
pub const VIEWED_BOOKS_KEY: &str = "book-discovery-viewed-books";
pub const MAX_VIEWED_BOOKS: usize = 30;

/// An entry that is unique within its history by `key()`.
pub trait HistoryRecord: Clone + Serialize + DeserializeOwned {
    fn key(&self) -> &str;
}

impl HistoryRecord for String {
    fn key(&self) -> &str { self }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedBook {
    pub id: String,
    pub title: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "viewedAt")]
    pub viewed_at: i64,
}

impl HistoryRecord for ViewedBook {
    fn key(&self) -> &str { &self.id }
}

pub struct HistoryStore<T> {
    storage: Arc<dyn KvStore>,
    storage_key: &'static str,
    bound: usize,
    entries: Vec<T>,
    loaded: bool,
}

pub type SearchHistory = HistoryStore<String>;
pub type ViewedHistory = HistoryStore<ViewedBook>;

impl<T: HistoryRecord> HistoryStore<T> {
    /// An empty, not-yet-loaded history. Nothing is written until [`load`](Self::load) ran.
    pub fn new(storage: Arc<dyn KvStore>, storage_key: &'static str, bound: usize) -> Self {
        Self { storage, storage_key, bound, entries: Vec::new(), loaded: false }
    }

    /// Read the stored list once. Missing or unreadable data yields an empty list.
    /// Entries added before loading stay in front of the stored ones.
    pub fn load(&mut self) {
        if self.loaded { return; }
        let stored: Vec<T> = match self.storage.get(self.storage_key) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(key = self.storage_key, error = %e, "discarding unreadable history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = self.storage_key, error = %e, "failed to load history");
                Vec::new()
            }
        };
        let pending = std::mem::replace(&mut self.entries, stored);
        self.entries.truncate(self.bound);
        let had_pending = !pending.is_empty();
        for entry in pending.into_iter().rev() {
            self.upsert(entry);
        }
        self.loaded = true;
        tracing::debug!(key = self.storage_key, len = self.entries.len(), "history loaded");
        if had_pending { self.persist(); }
    }

    pub fn add(&mut self, entry: T) {
        self.upsert(entry);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn entries(&self) -> &[T] { &self.entries }

    pub fn recent(&self, n: usize) -> &[T] { &self.entries[..n.min(self.entries.len())] }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn is_loaded(&self) -> bool { self.loaded }

    pub fn bound(&self) -> usize { self.bound }

    fn upsert(&mut self, entry: T) {
        self.entries.retain(|e| e.key() != entry.key());
        self.entries.insert(0, entry);
        self.entries.truncate(self.bound);
    }

    fn persist(&self) {
        if !self.loaded {
            tracing::trace!(key = self.storage_key, "history not loaded yet, skipping save");
            return;
        }
        if let Err(e) = self.save() {
            tracing::warn!(key = self.storage_key, error = %e, "failed to save history");
        }
    }

    fn save(&self) -> FeedResult<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.storage.set(self.storage_key, &json)
    }
}

impl HistoryStore<String> {
    pub fn searches(storage: Arc<dyn KvStore>) -> Self { Self::new(storage, SEARCH_HISTORY_KEY, MAX_SEARCH_HISTORY) }

    /// Record a submitted query. Blank queries are ignored.
    pub fn add_query(&mut self, query: &str) {
        if query.trim().is_empty() { return; }
        self.add(query.to_string());
    }
}

impl HistoryStore<ViewedBook> {
    pub fn viewed(storage: Arc<dyn KvStore>) -> Self { Self::new(storage, VIEWED_BOOKS_KEY, MAX_VIEWED_BOOKS) }

    pub fn add_viewed_book(&mut self, id: &str, title: &str) {
        let now = time::OffsetDateTime::now_utc();
        self.add_viewed_book_at(id, title, (now.unix_timestamp_nanos() / 1_000_000) as i64);
    }

    pub fn add_viewed_book_at(&mut self, id: &str, title: &str, viewed_at: i64) {
        self.add(ViewedBook { id: id.to_string(), title: title.to_string(), viewed_at });
    }

    /// Ids of the `count` most recently viewed books.
    pub fn recently_viewed(&self, count: usize) -> Vec<String> {
        self.recent(count).iter().map(|b| b.id.clone()).collect()
    }
}
