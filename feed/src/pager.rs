//! Result cache and pager for one feed.
//!
//! The pager is plain state: a load is started with [`Pager::begin_load`], the
//! caller performs the catalog request, and hands the outcome back through
//! [`Pager::complete`]. Everything between the two calls may interleave with
//! other loads; the in-flight set keyed by [`PageKey`] keeps a page from being
//! requested twice.
//!
//! Every session change bumps a generation counter. A fetch is applied to the
//! visible results only if its generation is still the current one, so a
//! request started before switching away and back to the same key only fills
//! the cache.
//!
//! The page cache lives as long as the pager. Changing the session key only
//! resets the visible results; pages cached for an earlier key are replayed
//! without a request when that key comes back.

use crate::error::{FeedError, FeedResult};
use crate::model::{CatalogItem, CatalogQuery, Category, PageKey, SessionKey, SortMode, PAGE_SIZE};
use crate::volume::RawVolume;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedState {
    Idle,
    Loading,
    Exhausted,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: PageKey,
    pub initial: bool,
    pub generation: u64,
}

impl FetchTicket {
    pub fn query(&self) -> CatalogQuery { CatalogQuery::for_page(&self.key) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStep {
    /// Search text is empty.
    Skipped,
    /// Served from cache without a request.
    Cached { count: usize },
    /// The page is already being fetched.
    InFlight,
    /// The caller must fetch and pass the result to [`Pager::complete`].
    Fetch(FetchTicket),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied { count: usize },
    Failed,
    /// The session was reset while the request was out; only the cache was updated.
    Stale,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub search: String,
    pub category: Category,
    pub sort: SortMode,
    pub page: usize,
    pub state: FeedState,
    pub exhausted: bool,
    pub error: Option<String>,
    pub items: Vec<CatalogItem>,
}

#[derive(Debug, Default)]
pub struct Pager {
    session: SessionKey,
    cursor: usize,
    results: Vec<CatalogItem>,
    generation: u64,
    cache: HashMap<PageKey, Vec<CatalogItem>>,
    /// Owning generation and initial flag of each outstanding request.
    in_flight: HashMap<PageKey, (u64, bool)>,
    exhausted: bool,
    error: Option<FeedError>,
    initial_active: bool,
}

impl Pager {
    pub fn new() -> Self { Self::default() }

    pub fn session(&self) -> &SessionKey { &self.session }

    /// Switch to `key`. Returns `None` when the key is unchanged and the feed
    /// has not errored, otherwise the result of loading page 0 for the new session.
    pub fn set_session(&mut self, key: SessionKey) -> Option<LoadStep> {
        if key == self.session && self.error.is_none() { return None; }
        tracing::debug!(search = %key.search, category = %key.category, sort = %key.sort, "feed session reset");
        self.session = key;
        self.generation += 1;
        self.cursor = 0;
        self.results.clear();
        self.exhausted = false;
        self.error = None;
        self.initial_active = false;
        Some(self.begin_load(0, true))
    }

    pub fn begin_load(&mut self, page: usize, initial: bool) -> LoadStep {
        if self.session.search.is_empty() { return LoadStep::Skipped; }
        let key = self.session.page(page);

        if let Some(cached) = self.cache.get(&key) {
            let items = cached.clone();
            let count = items.len();
            tracing::trace!(%key, count, "page cache hit");
            self.apply(items, initial);
            self.exhausted = count < PAGE_SIZE;
            return LoadStep::Cached { count };
        }

        if let Some(owner) = self.in_flight.get_mut(&key) {
            // a request left over from an earlier generation is adopted by this one
            if owner.0 != self.generation {
                *owner = (self.generation, initial);
                if initial { self.initial_active = true; }
            }
            tracing::trace!(%key, "page already in flight");
            return LoadStep::InFlight;
        }

        self.in_flight.insert(key.clone(), (self.generation, initial));
        if initial { self.initial_active = true; }
        self.error = None;
        LoadStep::Fetch(FetchTicket { key, initial, generation: self.generation })
    }

    /// Apply the outcome of a fetch started by [`begin_load`](Self::begin_load).
    /// The in-flight marker is cleared whatever the outcome.
    pub fn complete(&mut self, ticket: FetchTicket, result: FeedResult<Vec<RawVolume>>) -> Completion {
        let (generation, initial) = self.in_flight.remove(&ticket.key).unwrap_or((ticket.generation, ticket.initial));
        let current = generation == self.generation;
        if current && initial { self.initial_active = false; }

        match result {
            Ok(raw) => {
                let items: Vec<CatalogItem> = raw.into_iter().map(RawVolume::normalize).collect();
                let count = items.len();
                let outcome = if current {
                    self.apply(items.clone(), initial);
                    self.exhausted = count < PAGE_SIZE;
                    Completion::Applied { count }
                } else {
                    Completion::Stale
                };
                tracing::debug!(key = %ticket.key, count, exhausted = self.exhausted, "page fetched");
                self.cache.insert(ticket.key, items);
                outcome
            }
            Err(e) if current => {
                tracing::warn!(key = %ticket.key, error = %e, "page fetch failed");
                self.error = Some(e);
                self.exhausted = true;
                Completion::Failed
            }
            Err(e) => {
                tracing::debug!(key = %ticket.key, error = %e, "stale page fetch failed");
                Completion::Stale
            }
        }
    }

    pub fn state(&self) -> FeedState {
        if self.error.is_some() {
            FeedState::Errored
        } else if self.initial_active || !self.in_flight.is_empty() {
            FeedState::Loading
        } else if self.exhausted {
            FeedState::Exhausted
        } else {
            FeedState::Idle
        }
    }

    /// Whether a scroll signal may load the next page.
    pub fn can_advance(&self) -> bool { self.state() == FeedState::Idle && !self.session.search.is_empty() }

    /// Move the cursor forward and load that page, if the gate allows it.
    pub fn advance(&mut self) -> Option<LoadStep> {
        if !self.can_advance() { return None; }
        self.cursor += 1;
        Some(self.begin_load(self.cursor, false))
    }

    pub fn results(&self) -> &[CatalogItem] { &self.results }

    pub fn cursor(&self) -> usize { self.cursor }

    pub fn is_exhausted(&self) -> bool { self.exhausted }

    pub fn error(&self) -> Option<&FeedError> { self.error.as_ref() }

    pub fn in_flight(&self) -> usize { self.in_flight.len() }

    pub fn cached_pages(&self) -> usize { self.cache.len() }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            search: self.session.search.clone(),
            category: self.session.category,
            sort: self.session.sort,
            page: self.cursor,
            state: self.state(),
            exhausted: self.exhausted,
            error: self.error.as_ref().map(|e| e.user_message().to_string()),
            items: self.results.clone(),
        }
    }

    fn apply(&mut self, items: Vec<CatalogItem>, initial: bool) {
        if initial {
            self.results = items;
        } else {
            self.results.extend(items);
        }
    }
}
